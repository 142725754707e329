//! Central configuration for the provider_auth crate

use std::path::PathBuf;
use std::sync::LazyLock;

use url::Url;

use crate::provider::{HttpMethod, ProviderError};

/// Path prefix under which all provider routes are mounted.
/// Default: "/auth"
pub static AUTH_CONTEXT_ROOT: LazyLock<String> =
    LazyLock::new(|| std::env::var("AUTH_CONTEXT_ROOT").unwrap_or_else(|_| "/auth".to_string()));

/// Public base URL of this server, used to build strategy callback URLs.
/// Default: "http://localhost:3000"
pub static AUTH_SERVER_BASE_URL: LazyLock<String> = LazyLock::new(|| {
    std::env::var("AUTH_SERVER_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
});

/// Base URL of the user interface that receives success/failure redirects.
/// Falls back to the server base URL.
pub static AUTH_UI_BASE_URL: LazyLock<String> = LazyLock::new(|| {
    std::env::var("AUTH_UI_BASE_URL").unwrap_or_else(|_| AUTH_SERVER_BASE_URL.clone())
});

pub static AUTH_ENABLE_SESSIONS: LazyLock<bool> = LazyLock::new(|| {
    std::env::var("AUTH_ENABLE_SESSIONS")
        .map(|val| val.to_lowercase() == "true")
        .unwrap_or(false)
});

/// Secret for signed cookies. Without it a random per-process key is used,
/// which does not survive restarts.
pub static AUTH_COOKIE_SECRET: LazyLock<Option<String>> =
    LazyLock::new(|| std::env::var("AUTH_COOKIE_SECRET").ok().filter(|s| !s.is_empty()));

/// Directory scanned for `providers*.json` / `providers*.toml` files.
pub static AUTH_PROVIDERS_DIR: LazyLock<PathBuf> = LazyLock::new(|| {
    std::env::var("AUTH_PROVIDERS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("authentication"))
});

/// Deployment environment selecting `providers.<env>.*` overrides.
pub static AUTH_ENV: LazyLock<Option<String>> = LazyLock::new(|| {
    std::env::var("AUTH_ENV")
        .ok()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
});

pub static AUTH_STRICT: LazyLock<bool> = LazyLock::new(|| {
    std::env::var("AUTH_STRICT")
        .map(|val| val.to_lowercase() == "true")
        .unwrap_or(false)
});

/// Where the link cookie is scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkCookiePath {
    /// Callback path with a trailing `/callback` segment removed.
    #[default]
    CallbackParent,
    /// The provider's auth path.
    AuthPath,
}

/// Route derivation defaults that differ between deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePolicy {
    /// Method used when a route does not configure one explicitly.
    pub default_method: HttpMethod,
    pub link_cookie_path: LinkCookiePath,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            default_method: HttpMethod::Get,
            link_cookie_path: LinkCookiePath::CallbackParent,
        }
    }
}

/// Process-wide options shared by every provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentOptions {
    pub context_root: String,
    pub server_base_url: Url,
    pub ui_base_url: Url,
    pub enable_session_support: bool,
    pub cookie_secret: Option<String>,
    pub providers_dir: PathBuf,
    pub environment: Option<String>,
    /// Abort boot on the first provider configuration error.
    pub strict: bool,
    pub policy: RoutePolicy,
}

impl ComponentOptions {
    /// Options with built-in defaults and the given server base URL.
    pub fn new(server_base_url: Url) -> Self {
        Self {
            context_root: "/auth".to_string(),
            ui_base_url: server_base_url.clone(),
            server_base_url,
            enable_session_support: false,
            cookie_secret: None,
            providers_dir: PathBuf::from("authentication"),
            environment: None,
            strict: false,
            policy: RoutePolicy::default(),
        }
    }

    /// Options read from `AUTH_*` environment variables.
    pub fn from_env() -> Result<Self, ProviderError> {
        let server_base_url = parse_base_url("AUTH_SERVER_BASE_URL", &AUTH_SERVER_BASE_URL)?;
        let ui_base_url = parse_base_url("AUTH_UI_BASE_URL", &AUTH_UI_BASE_URL)?;

        Ok(Self {
            context_root: AUTH_CONTEXT_ROOT.clone(),
            server_base_url,
            ui_base_url,
            enable_session_support: *AUTH_ENABLE_SESSIONS,
            cookie_secret: AUTH_COOKIE_SECRET.clone(),
            providers_dir: AUTH_PROVIDERS_DIR.clone(),
            environment: AUTH_ENV.clone(),
            strict: *AUTH_STRICT,
            policy: RoutePolicy::default(),
        })
    }

    pub fn with_context_root(mut self, context_root: impl Into<String>) -> Self {
        self.context_root = context_root.into();
        self
    }

    pub fn with_ui_base_url(mut self, ui_base_url: Url) -> Self {
        self.ui_base_url = ui_base_url;
        self
    }

    pub fn with_session_support(mut self, enabled: bool) -> Self {
        self.enable_session_support = enabled;
        self
    }

    pub fn with_cookie_secret(mut self, secret: impl Into<String>) -> Self {
        self.cookie_secret = Some(secret.into());
        self
    }

    pub fn with_providers_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.providers_dir = dir.into();
        self
    }

    pub fn with_environment(mut self, environment: Option<&str>) -> Self {
        self.environment = environment.map(|s| s.to_lowercase());
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_policy(mut self, policy: RoutePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Context root without a trailing slash; empty when mounted at "/".
    pub(crate) fn normalized_context_root(&self) -> String {
        let root = self.context_root.trim_end_matches('/');
        if root.is_empty() || root.starts_with('/') {
            root.to_string()
        } else {
            format!("/{root}")
        }
    }

    /// Cookies are signed whenever a secret is available.
    pub fn signed_cookies(&self) -> bool {
        self.cookie_secret.is_some()
    }

    pub(crate) fn secure_cookies(&self) -> bool {
        self.server_base_url.scheme() == "https"
    }
}

fn parse_base_url(var: &str, value: &str) -> Result<Url, ProviderError> {
    Url::parse(value).map_err(|e| ProviderError::InvalidOption(format!("{var}={value}: {e}")))
}
