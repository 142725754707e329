use std::sync::LazyLock;

pub static SESSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    std::env::var("AUTH_SESSION_COOKIE_NAME")
        .ok()
        .unwrap_or("SessionId".to_string())
});

/// Session lifetime in seconds.
pub static SESSION_COOKIE_MAX_AGE: LazyLock<u64> = LazyLock::new(|| {
    std::env::var("AUTH_SESSION_COOKIE_MAX_AGE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3600)
});

/// Access token lifetime in seconds for tokens issued by the in-memory store.
pub static ACCESS_TOKEN_TTL: LazyLock<i64> = LazyLock::new(|| {
    std::env::var("AUTH_ACCESS_TOKEN_TTL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1_209_600)
});
