use std::sync::Arc;

use crate::config::ComponentOptions;
use crate::errors::CoordinationError;
use crate::flow::{FlowContext, FlowController};
use crate::link_cookie::{CookieSigner, LinkCookieBridge};
use crate::provider::{
    ProviderConfig, ProviderError, ProviderRegistry, ResolvedProvider, load_provider_configs,
    resolve,
};
use crate::session::{SessionManager, TokenResolver};
use crate::storage::{InMemoryIdentityStore, InMemorySessionManager, InMemoryTokenStore};
use crate::strategy::{
    AuthStrategy, LoginCallback, SchemeRegistry, StrategyAdapter, StrategyError, StrategyModules,
    UserIdentityStore, VerifyFunction, default_login_callback,
};

/// Collects collaborators, then turns provider configuration into a frozen
/// registry and one flow controller per enabled provider.
pub struct ProviderAuthBuilder {
    options: ComponentOptions,
    identities: Option<Arc<dyn UserIdentityStore>>,
    sessions: Option<Arc<dyn SessionManager>>,
    tokens: Option<Arc<dyn TokenResolver>>,
    modules: StrategyModules,
    schemes: SchemeRegistry,
    login_callback: LoginCallback,
}

impl ProviderAuthBuilder {
    fn new(options: ComponentOptions) -> Self {
        Self {
            options,
            identities: None,
            sessions: None,
            tokens: None,
            modules: StrategyModules::new(),
            schemes: SchemeRegistry::new(),
            login_callback: default_login_callback(),
        }
    }

    pub fn with_identity_store(mut self, identities: Arc<dyn UserIdentityStore>) -> Self {
        self.identities = Some(identities);
        self
    }

    pub fn with_session_manager(mut self, sessions: Arc<dyn SessionManager>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn with_token_resolver(mut self, tokens: Arc<dyn TokenResolver>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Use process-local stores for identities, tokens and sessions.
    pub fn with_in_memory_stores(self) -> Self {
        let tokens = Arc::new(InMemoryTokenStore::default());
        let identities = Arc::new(InMemoryIdentityStore::new(tokens.clone()));
        let sessions = Arc::new(InMemorySessionManager::new(self.options.secure_cookies()));
        self.with_identity_store(identities)
            .with_token_resolver(tokens)
            .with_session_manager(sessions)
    }

    pub fn with_strategy_modules(mut self, modules: StrategyModules) -> Self {
        self.modules = modules;
        self
    }

    pub fn register_strategy<F>(mut self, module: &str, strategy: &str, factory: F) -> Self
    where
        F: Fn(Arc<ResolvedProvider>, Arc<dyn VerifyFunction>) -> Result<Arc<dyn AuthStrategy>, StrategyError>
            + Send
            + Sync
            + 'static,
    {
        self.modules.register(module, strategy, factory);
        self
    }

    pub fn register_scheme(mut self, scheme: &str, adapter: Arc<dyn StrategyAdapter>) -> Self {
        self.schemes.register(scheme, adapter);
        self
    }

    pub fn with_login_callback(mut self, login_callback: LoginCallback) -> Self {
        self.login_callback = login_callback;
        self
    }

    /// Load provider files from `options.providers_dir` and configure them.
    pub fn configure_from_dir(self) -> Result<ProviderAuth, CoordinationError> {
        let configs = load_provider_configs(
            &self.options.providers_dir,
            self.options.environment.as_deref(),
        )?;
        self.configure_entries(configs)
    }

    /// Resolve and register every provider.
    ///
    /// A provider with a configuration error is logged and skipped, or aborts
    /// the whole boot in strict mode. Duplicate names and route collisions are
    /// always fatal.
    pub fn configure<I>(self, configs: I) -> Result<ProviderAuth, CoordinationError>
    where
        I: IntoIterator<Item = (String, ProviderConfig)>,
    {
        self.configure_entries(configs.into_iter().map(|(name, config)| (name, Ok(config))))
    }

    fn configure_entries<I>(self, entries: I) -> Result<ProviderAuth, CoordinationError>
    where
        I: IntoIterator<Item = (String, Result<ProviderConfig, ProviderError>)>,
    {
        let identities = self.identities.clone().ok_or_else(|| {
            CoordinationError::Configuration("no identity store configured".to_string())
        })?;
        let sessions = self.sessions.clone().ok_or_else(|| {
            CoordinationError::Configuration("no session manager configured".to_string())
        })?;
        let tokens = self.tokens.clone().ok_or_else(|| {
            CoordinationError::Configuration("no token resolver configured".to_string())
        })?;

        let context = FlowContext {
            sessions: sessions.clone(),
            tokens,
            bridge: LinkCookieBridge::new(CookieSigner::from_options(&self.options)?),
            sign_cookies: self.options.signed_cookies(),
            secure_cookies: self.options.secure_cookies(),
        };

        let mut registry = ProviderRegistry::builder();
        let mut flows = Vec::new();

        for (name, config) in entries {
            let prepared = config
                .and_then(|config| resolve(&name, &config, &self.options))
                .map(Arc::new)
                .and_then(|provider| {
                    let strategy = if provider.disabled {
                        None
                    } else {
                        Some(self.build_strategy(&provider, &identities)?)
                    };
                    Ok((provider, strategy))
                });

            let (provider, strategy) = match prepared {
                Ok(prepared) => prepared,
                Err(err) if self.options.strict => return Err(err.into()),
                Err(err) => {
                    tracing::error!("Skipping provider '{}': {}", name, err);
                    continue;
                }
            };

            registry.add(provider.clone())?;
            if let Some(strategy) = strategy {
                flows.push(FlowController::new(provider, strategy, context.clone()));
            }
        }

        let registry = registry.build()?;
        tracing::info!(
            "Configured {} providers, {} with routes",
            registry.len(),
            flows.len()
        );

        Ok(ProviderAuth {
            registry: Arc::new(registry),
            flows,
            sessions,
            options: self.options,
        })
    }

    fn build_strategy(
        &self,
        provider: &Arc<ResolvedProvider>,
        identities: &Arc<dyn UserIdentityStore>,
    ) -> Result<Arc<dyn AuthStrategy>, ProviderError> {
        let to_configuration =
            |err: StrategyError| ProviderError::configuration(&provider.name, err.to_string());

        let adapter = self.schemes.adapter_for(provider).map_err(to_configuration)?;
        let verify = adapter.make_verify_function(
            provider.clone(),
            identities.clone(),
            self.login_callback.clone(),
        );
        self.modules
            .build(provider.clone(), verify)
            .map_err(to_configuration)
    }
}

/// Booted provider set: the frozen registry plus a flow per enabled provider.
#[derive(Clone)]
pub struct ProviderAuth {
    registry: Arc<ProviderRegistry>,
    flows: Vec<FlowController>,
    sessions: Arc<dyn SessionManager>,
    options: ComponentOptions,
}

impl ProviderAuth {
    pub fn builder(options: ComponentOptions) -> ProviderAuthBuilder {
        ProviderAuthBuilder::new(options)
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn flows(&self) -> &[FlowController] {
        &self.flows
    }

    pub fn flow(&self, name: &str) -> Option<&FlowController> {
        self.flows.iter().find(|flow| flow.provider().name == name)
    }

    pub fn sessions(&self) -> &Arc<dyn SessionManager> {
        &self.sessions
    }

    pub fn options(&self) -> &ComponentOptions {
        &self.options
    }
}
