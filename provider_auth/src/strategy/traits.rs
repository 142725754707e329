use std::sync::Arc;

use async_trait::async_trait;

use crate::provider::ResolvedProvider;

use super::errors::StrategyError;
use super::types::{
    AuthenticateOptions, Credentials, LoginOptions, LoginResult, Profile, StrategyOutcome,
    StrategyRequest, Verified,
};

/// A concrete verification mechanism (OAuth2 client, LDAP bind, ...)
/// registered under one provider name.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn authenticate(
        &self,
        request: &StrategyRequest,
        options: &AuthenticateOptions,
    ) -> Result<StrategyOutcome, StrategyError>;
}

/// Persistence of users and their linked identities.
#[async_trait]
pub trait UserIdentityStore: Send + Sync {
    async fn login(
        &self,
        provider: &str,
        auth_scheme: &str,
        profile: Profile,
        credentials: Credentials,
        options: LoginOptions,
    ) -> Result<LoginResult, StrategyError>;
}

/// Called by a strategy once it has talked to the provider.
///
/// A `None` profile means the provider did not identify anybody; the result
/// is then a `Verified` without user rather than an error.
#[async_trait]
pub trait VerifyFunction: Send + Sync {
    async fn verify(
        &self,
        request: &StrategyRequest,
        profile: Option<Profile>,
        credentials: Credentials,
    ) -> Result<Verified, StrategyError>;
}

/// Turns the identity store's login result into the flow's `Verified` value.
pub type LoginCallback = Arc<dyn Fn(LoginResult) -> Verified + Send + Sync>;

/// Builds a provider's strategy around its verify function.
pub type StrategyFactory = Arc<
    dyn Fn(Arc<ResolvedProvider>, Arc<dyn VerifyFunction>) -> Result<Arc<dyn AuthStrategy>, StrategyError>
        + Send
        + Sync,
>;

/// Per-scheme bridge between a strategy's raw callback and the identity store.
pub trait StrategyAdapter: Send + Sync {
    fn make_verify_function(
        &self,
        provider: Arc<ResolvedProvider>,
        identities: Arc<dyn UserIdentityStore>,
        login_callback: LoginCallback,
    ) -> Arc<dyn VerifyFunction>;
}
