//! provider_auth_axum - axum integration for provider_auth
//!
//! Installs the resolved auth and callback routes of every enabled provider,
//! the provider listing endpoints, and a login guard that remembers where an
//! anonymous browser was heading.

mod config;
mod error;
mod extract;
mod handlers;
mod middleware;
mod response;
mod router;

pub use config::{AUTH_LISTING_ROOT, AUTH_REDIRECT_ANON};
pub use middleware::{SessionUser, require_login};
pub use router::{listing_router, provider_auth_router, provider_auth_router_no_trace};

// Re-export the core crate so applications need a single dependency
pub use provider_auth;
