mod adapters;
mod errors;
mod modules;
mod traits;
mod types;

pub use adapters::{
    BASIC_PROFILE_SCHEME, BUILTIN_SCHEMES, BasicProfileAdapter, DEFAULT_AUTH_SCHEME,
    DefaultAdapter, SchemeRegistry, default_login_callback,
};
pub use errors::StrategyError;
pub use modules::StrategyModules;
pub use traits::{
    AuthStrategy, LoginCallback, StrategyAdapter, StrategyFactory, UserIdentityStore,
    VerifyFunction,
};
pub use types::{
    AccessToken, AuthInfo, AuthenticateOptions, Credentials, Identity, LoginOptions, LoginResult,
    Profile, StrategyOutcome, StrategyRequest, User, Verified,
};
