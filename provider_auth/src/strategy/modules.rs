use std::collections::HashMap;
use std::sync::Arc;

use crate::provider::ResolvedProvider;

use super::errors::StrategyError;
use super::traits::{AuthStrategy, StrategyFactory, VerifyFunction};

/// Strategy factories keyed by `(module, strategy)`.
#[derive(Clone, Default)]
pub struct StrategyModules {
    factories: HashMap<(String, String), StrategyFactory>,
}

impl StrategyModules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, module: &str, strategy: &str, factory: F) -> &mut Self
    where
        F: Fn(Arc<ResolvedProvider>, Arc<dyn VerifyFunction>) -> Result<Arc<dyn AuthStrategy>, StrategyError>
            + Send
            + Sync
            + 'static,
    {
        self.factories
            .insert((module.to_string(), strategy.to_string()), Arc::new(factory));
        self
    }

    pub fn contains(&self, module: &str, strategy: &str) -> bool {
        self.factories
            .contains_key(&(module.to_string(), strategy.to_string()))
    }

    /// Construct the strategy configured for `provider`.
    pub fn build(
        &self,
        provider: Arc<ResolvedProvider>,
        verify: Arc<dyn VerifyFunction>,
    ) -> Result<Arc<dyn AuthStrategy>, StrategyError> {
        let module = provider
            .module
            .clone()
            .ok_or_else(|| StrategyError::MissingModule(provider.name.clone()))?;
        let key = (module, provider.strategy.clone());

        let factory = self
            .factories
            .get(&key)
            .ok_or_else(|| StrategyError::UnknownStrategy {
                module: key.0.clone(),
                strategy: key.1.clone(),
            })?;
        factory(provider, verify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComponentOptions;
    use crate::provider::{ProviderConfig, resolve};
    use crate::strategy::{
        AuthenticateOptions, Credentials, Profile, StrategyOutcome, StrategyRequest, Verified,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use url::Url;

    struct Noop(String);

    #[async_trait]
    impl AuthStrategy for Noop {
        fn name(&self) -> &str {
            &self.0
        }

        async fn authenticate(
            &self,
            _request: &StrategyRequest,
            _options: &AuthenticateOptions,
        ) -> Result<StrategyOutcome, StrategyError> {
            Ok(StrategyOutcome::Complete(Verified::no_user()))
        }
    }

    struct NoVerify;

    #[async_trait]
    impl VerifyFunction for NoVerify {
        async fn verify(
            &self,
            _request: &StrategyRequest,
            _profile: Option<Profile>,
            _credentials: Credentials,
        ) -> Result<Verified, StrategyError> {
            Ok(Verified::no_user())
        }
    }

    fn provider(value: serde_json::Value) -> Arc<ResolvedProvider> {
        let options = ComponentOptions::new(Url::parse("http://localhost:3000").unwrap());
        let config: ProviderConfig = serde_json::from_value(value).unwrap();
        Arc::new(resolve("github", &config, &options).unwrap())
    }

    fn modules() -> StrategyModules {
        let mut modules = StrategyModules::new();
        modules.register("passport-github", "Strategy", |provider, _verify| {
            Ok(Arc::new(Noop(provider.name.clone())) as Arc<dyn AuthStrategy>)
        });
        modules
    }

    #[test]
    fn test_build_registered_strategy() {
        let strategy = modules()
            .build(provider(json!({"module": "passport-github"})), Arc::new(NoVerify))
            .ok()
            .unwrap();
        assert_eq!(strategy.name(), "github");
    }

    #[test]
    fn test_missing_module() {
        let err = modules()
            .build(provider(json!({})), Arc::new(NoVerify))
            .err()
            .unwrap();
        assert_eq!(err, StrategyError::MissingModule("github".to_string()));
    }

    #[test]
    fn test_unknown_strategy() {
        let err = modules()
            .build(
                provider(json!({"module": "passport-github", "strategy": "OAuth2Strategy"})),
                Arc::new(NoVerify),
            )
            .err()
            .unwrap();
        assert!(matches!(err, StrategyError::UnknownStrategy { .. }));
    }
}
