mod config;
mod errors;
mod traits;

pub use config::{ACCESS_TOKEN_TTL, SESSION_COOKIE_MAX_AGE, SESSION_COOKIE_NAME};
pub use errors::SessionError;
pub use traits::{SessionHandle, SessionManager, TokenResolver};
