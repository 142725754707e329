use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::provider::HttpMethod;

/// Scheme-specific credentials handed over by a strategy (tokens, secrets).
pub type Credentials = Map<String, Value>;

/// Local account as returned by the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub account: Option<String>,
    pub label: Option<String>,
}

/// Issued access token. `ttl` is in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub id: String,
    pub user_id: String,
    pub ttl: i64,
    pub created_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn ttl_ms(&self) -> i64 {
        self.ttl.saturating_mul(1000)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        (now - self.created_at).num_seconds() >= self.ttl
    }
}

/// Link between a local user and an external provider account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub provider: String,
    pub auth_scheme: String,
    pub external_id: String,
    pub user_id: String,
    pub profile: Value,
    pub credentials: Credentials,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile reported by an external provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub provider: String,
    pub id: String,
    pub display_name: Option<String>,
    pub emails: Vec<String>,
    /// Provider payload as received.
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoginOptions {
    /// Create a local user when the profile is not known yet.
    pub auto_login: bool,
    /// Attach the identity to this user instead of logging in.
    pub link_user_id: Option<String>,
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginResult {
    pub user: User,
    pub identity: Identity,
    pub access_token: Option<AccessToken>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthInfo {
    pub identity: Identity,
    pub access_token: Option<AccessToken>,
}

/// Normalized verification result. No user means authentication failed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Verified {
    pub user: Option<User>,
    pub auth_info: Option<AuthInfo>,
}

impl Verified {
    pub fn no_user() -> Self {
        Self::default()
    }

    pub fn access_token(&self) -> Option<&AccessToken> {
        self.auth_info.as_ref().and_then(|info| info.access_token.as_ref())
    }
}

/// What a strategy sees of the inbound HTTP request.
#[derive(Debug, Clone)]
pub struct StrategyRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: BTreeMap<String, String>,
    /// Decoded body for POST routes.
    pub body: Option<Value>,
    pub headers: HeaderMap,
    /// Token of the already authenticated caller, if any.
    pub caller: Option<AccessToken>,
}

impl StrategyRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: BTreeMap::new(),
            body: None,
            headers: HeaderMap::new(),
            caller: None,
        }
    }

    /// Look a parameter up in the query string, then in an object body.
    pub fn param(&self, name: &str) -> Option<String> {
        if let Some(value) = self.query.get(name) {
            return Some(value.clone());
        }
        match self.body.as_ref()?.get(name)? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticateOptions {
    pub session: bool,
    /// Set for link flows, where the caller is already logged in.
    pub authorize: bool,
    pub callback_url: Url,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    /// Send the browser elsewhere, usually to the provider's consent page.
    Redirect(String),
    Complete(Verified),
}
