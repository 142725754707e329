//! provider_auth - Provider option resolution and login/link flow coordination
//!
//! Turns per-provider configuration into fully resolved route, callback,
//! redirect and cookie settings, registers the providers in a frozen registry,
//! and drives the login and account-link flows against pluggable strategies,
//! identity stores and session managers.

mod bootstrap;
mod config;
mod errors;
mod flow;
mod link_cookie;
mod provider;
mod session;
mod storage;
mod strategy;
mod utils;

pub use bootstrap::{ProviderAuth, ProviderAuthBuilder};
pub use errors::CoordinationError;

pub use config::{
    AUTH_CONTEXT_ROOT, AUTH_COOKIE_SECRET, AUTH_ENABLE_SESSIONS, AUTH_ENV, AUTH_PROVIDERS_DIR,
    AUTH_SERVER_BASE_URL, AUTH_STRICT, AUTH_UI_BASE_URL, ComponentOptions, LinkCookiePath,
    RoutePolicy,
};

pub use provider::{
    BodyParser, CookieSpec, HttpMethod, LoadedProviders, ProviderConfig, ProviderError,
    ProviderRegistry, ProviderRegistryBuilder, ProviderSummary, ResolvedProvider, RouteConfig,
    RouteOptions, RouteSpec, load_provider_configs, resolve,
};

pub use strategy::{
    AccessToken, AuthInfo, AuthStrategy, AuthenticateOptions, BASIC_PROFILE_SCHEME,
    BUILTIN_SCHEMES, BasicProfileAdapter, Credentials, DEFAULT_AUTH_SCHEME, DefaultAdapter,
    Identity, LoginCallback, LoginOptions, LoginResult, Profile, SchemeRegistry, StrategyAdapter,
    StrategyError, StrategyFactory, StrategyModules, StrategyOutcome, StrategyRequest,
    User, UserIdentityStore, Verified, VerifyFunction, default_login_callback,
};

pub use flow::{
    ACCESS_TOKEN_COOKIE, AUTHENTICATION_FAILED, AuthFailure, FlowBody, FlowContext,
    FlowController, FlowError, FlowOutcome, FlowResponse, USER_ID_COOKIE,
};

pub use link_cookie::{
    CookieSigner, LINK_COOKIE_MAX_AGE_MS, LINK_COOKIE_PREFIX, LinkCookieBridge, link_cookie_name,
};

pub use session::{
    ACCESS_TOKEN_TTL, SESSION_COOKIE_MAX_AGE, SESSION_COOKIE_NAME, SessionError, SessionHandle,
    SessionManager, TokenResolver,
};

pub use storage::{InMemoryIdentityStore, InMemorySessionManager, InMemoryTokenStore};

pub use utils::{UtilError, append_query, cookie_value};
