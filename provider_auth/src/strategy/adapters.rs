use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::provider::ResolvedProvider;

use super::errors::StrategyError;
use super::traits::{LoginCallback, StrategyAdapter, UserIdentityStore, VerifyFunction};
use super::types::{AuthInfo, Credentials, LoginOptions, LoginResult, Profile, StrategyRequest, Verified};

/// Scheme names handled by [`DefaultAdapter`].
pub const BUILTIN_SCHEMES: &[&str] = &[
    "ldap",
    "local",
    "oauth",
    "oauth1",
    "oauth 1.0",
    "oauth2",
    "oauth 2.0",
    "openid",
    "openid connect",
];

/// Scheme reported to the identity store when none is configured.
pub const DEFAULT_AUTH_SCHEME: &str = "oauth2";

/// Registry id of [`BasicProfileAdapter`].
pub const BASIC_PROFILE_SCHEME: &str = "basic-profile";

/// Packages a login result as `{user, authInfo: {identity, accessToken?}}`.
pub fn default_login_callback() -> LoginCallback {
    Arc::new(|result: LoginResult| Verified {
        user: Some(result.user),
        auth_info: Some(AuthInfo {
            identity: result.identity,
            access_token: result.access_token,
        }),
    })
}

/// Adapter for the built-in OAuth, OpenID, LDAP and local schemes.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAdapter;

impl StrategyAdapter for DefaultAdapter {
    fn make_verify_function(
        &self,
        provider: Arc<ResolvedProvider>,
        identities: Arc<dyn UserIdentityStore>,
        login_callback: LoginCallback,
    ) -> Arc<dyn VerifyFunction> {
        Arc::new(ProfileVerify {
            provider,
            identities,
            login_callback,
            keep_credentials: true,
        })
    }
}

/// Adapter for schemes that authenticate with a basic username/password
/// exchange and only yield a profile. Credentials are never persisted.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicProfileAdapter;

impl StrategyAdapter for BasicProfileAdapter {
    fn make_verify_function(
        &self,
        provider: Arc<ResolvedProvider>,
        identities: Arc<dyn UserIdentityStore>,
        login_callback: LoginCallback,
    ) -> Arc<dyn VerifyFunction> {
        Arc::new(ProfileVerify {
            provider,
            identities,
            login_callback,
            keep_credentials: false,
        })
    }
}

struct ProfileVerify {
    provider: Arc<ResolvedProvider>,
    identities: Arc<dyn UserIdentityStore>,
    login_callback: LoginCallback,
    keep_credentials: bool,
}

impl ProfileVerify {
    fn login_options(&self, request: &StrategyRequest) -> LoginOptions {
        let mut extra: Map<String, Value> = self.provider.scheme_options.clone();
        let auto_login = match extra.remove("autoLogin") {
            Some(Value::Bool(auto_login)) => auto_login,
            _ => true,
        };

        LoginOptions {
            auto_login,
            link_user_id: if self.provider.link {
                request.caller.as_ref().map(|token| token.user_id.clone())
            } else {
                None
            },
            extra,
        }
    }
}

#[async_trait]
impl VerifyFunction for ProfileVerify {
    async fn verify(
        &self,
        request: &StrategyRequest,
        profile: Option<Profile>,
        credentials: Credentials,
    ) -> Result<Verified, StrategyError> {
        let Some(profile) = profile else {
            tracing::debug!("No profile resolved for provider '{}'", self.provider.name);
            return Ok(Verified::no_user());
        };

        let credentials = if self.keep_credentials {
            credentials
        } else {
            Credentials::new()
        };
        let scheme = self
            .provider
            .auth_scheme
            .as_deref()
            .unwrap_or(DEFAULT_AUTH_SCHEME);

        let result = self
            .identities
            .login(
                &self.provider.name,
                scheme,
                profile,
                credentials,
                self.login_options(request),
            )
            .await?;

        Ok((self.login_callback)(result))
    }
}

/// Scheme id to adapter table, consulted once per provider at boot.
#[derive(Clone)]
pub struct SchemeRegistry {
    default: Arc<dyn StrategyAdapter>,
    custom: HashMap<String, Arc<dyn StrategyAdapter>>,
}

impl Default for SchemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemeRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            default: Arc::new(DefaultAdapter),
            custom: HashMap::new(),
        };
        registry.register(BASIC_PROFILE_SCHEME, Arc::new(BasicProfileAdapter));
        registry
    }

    /// Register or replace the adapter for a custom scheme.
    pub fn register(&mut self, scheme: &str, adapter: Arc<dyn StrategyAdapter>) {
        self.custom.insert(scheme.trim().to_lowercase(), adapter);
    }

    pub fn is_builtin(scheme: &str) -> bool {
        BUILTIN_SCHEMES.contains(&scheme)
    }

    pub fn adapter_for(
        &self,
        provider: &ResolvedProvider,
    ) -> Result<Arc<dyn StrategyAdapter>, StrategyError> {
        match provider.auth_scheme.as_deref() {
            None => Ok(self.default.clone()),
            Some(scheme) if Self::is_builtin(scheme) => Ok(self.default.clone()),
            Some(scheme) => self
                .custom
                .get(scheme)
                .cloned()
                .ok_or_else(|| StrategyError::UnknownScheme(scheme.to_string())),
        }
    }
}
