//! Route locations owned by the axum integration

use std::sync::LazyLock;

/// Mount point of the provider listing endpoints
/// Default: "/api/auth-providers"
pub static AUTH_LISTING_ROOT: LazyLock<String> = LazyLock::new(|| {
    std::env::var("AUTH_LISTING_ROOT").unwrap_or_else(|_| "/api/auth-providers".to_string())
});

/// Where the login guard sends anonymous browsers
/// Default: "/account/login"
pub static AUTH_REDIRECT_ANON: LazyLock<String> = LazyLock::new(|| {
    std::env::var("AUTH_REDIRECT_ANON").unwrap_or_else(|_| "/account/login".to_string())
});
