use async_trait::async_trait;
use http::HeaderMap;

use crate::strategy::{AccessToken, User};

use super::errors::SessionError;

/// Result of a session write: the id now in effect and the `Set-Cookie`
/// headers that carry it to the browser.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    pub id: String,
    pub headers: HeaderMap,
}

/// Framework login mechanism. Establishing a session is all or nothing.
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// Id of the live session referenced by the request, if any.
    async fn session_id(&self, headers: &HeaderMap) -> Option<String>;

    async fn establish(&self, current: Option<&str>, user: &User)
    -> Result<SessionHandle, SessionError>;

    /// Remove and return the stored `returnTo` location.
    async fn take_return_to(&self, session_id: &str) -> Result<Option<String>, SessionError>;

    async fn remember_return_to(
        &self,
        current: Option<&str>,
        location: &str,
    ) -> Result<SessionHandle, SessionError>;

    async fn user_id(&self, session_id: &str) -> Result<Option<String>, SessionError>;
}

/// Maps an access token id back to the token, as token middleware would.
#[async_trait]
pub trait TokenResolver: Send + Sync {
    async fn resolve(&self, token_id: &str) -> Result<Option<AccessToken>, SessionError>;
}
