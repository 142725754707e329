use std::sync::Arc;

use async_trait::async_trait;
use provider_auth_axum::provider_auth::{
    AuthStrategy, AuthenticateOptions, Credentials, Profile, ResolvedProvider, StrategyError,
    StrategyOutcome, StrategyRequest, VerifyFunction, append_query,
};
use serde_json::json;

/// Strategy talking to the demo's built-in identity provider page.
///
/// The auth route redirects to `/idp/authorize`; the page sends the browser
/// back to the callback with `code=<username>`. POST routes may carry the
/// username directly in the body.
pub(crate) struct DemoIdpStrategy {
    provider: Arc<ResolvedProvider>,
    verify: Arc<dyn VerifyFunction>,
}

pub(crate) fn build(
    provider: Arc<ResolvedProvider>,
    verify: Arc<dyn VerifyFunction>,
) -> Result<Arc<dyn AuthStrategy>, StrategyError> {
    Ok(Arc::new(DemoIdpStrategy { provider, verify }))
}

#[async_trait]
impl AuthStrategy for DemoIdpStrategy {
    fn name(&self) -> &str {
        "demo-idp"
    }

    async fn authenticate(
        &self,
        request: &StrategyRequest,
        options: &AuthenticateOptions,
    ) -> Result<StrategyOutcome, StrategyError> {
        let username = request
            .param("code")
            .or_else(|| request.param("username"))
            .filter(|name| !name.trim().is_empty());

        let Some(username) = username else {
            let authorize = options
                .callback_url
                .join("/idp/authorize")
                .map_err(|e| StrategyError::Strategy(e.to_string()))?;
            let location = append_query(
                authorize.as_str(),
                &[
                    ("redirect_uri", options.callback_url.as_str()),
                    ("provider", self.provider.name.as_str()),
                ],
            )
            .map_err(|e| StrategyError::Strategy(e.to_string()))?;
            return Ok(StrategyOutcome::Redirect(location));
        };

        tracing::debug!("Demo IdP vouched for {}", username);

        let profile = Profile {
            provider: self.provider.name.clone(),
            id: username.clone(),
            display_name: Some(username.clone()),
            emails: vec![format!("{username}@demo.invalid")],
            raw: json!({"sub": username}),
        };
        let mut credentials = Credentials::new();
        credentials.insert("code".to_string(), json!(username));

        let verified = self.verify.verify(request, Some(profile), credentials).await?;
        Ok(StrategyOutcome::Complete(verified))
    }
}
