use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use provider_auth::SessionManager;

use super::config::AUTH_REDIRECT_ANON;

/// Id of the logged-in user, inserted into request extensions by `require_login`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
}

/// Let requests with a logged-in session through.
///
/// Anonymous GET requests have their location remembered as the session's
/// `returnTo` and are redirected to `AUTH_REDIRECT_ANON`; the login callback
/// sends the browser back there once. Anything else gets a 401.
pub async fn require_login(
    State(sessions): State<Arc<dyn SessionManager>>,
    mut req: Request,
    next: Next,
) -> Response {
    let session_id = sessions.session_id(req.headers()).await;

    if let Some(id) = &session_id {
        match sessions.user_id(id).await {
            Ok(Some(user_id)) => {
                req.extensions_mut().insert(SessionUser { id: user_id });
                return next.run(req).await;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to read session {}: {}", id, e),
        }
    }

    if req.method() != http::Method::GET {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }

    let location = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    match sessions
        .remember_return_to(session_id.as_deref(), &location)
        .await
    {
        Ok(handle) => (handle.headers, Redirect::to(AUTH_REDIRECT_ANON.as_str())).into_response(),
        Err(e) => {
            tracing::error!("Failed to remember returnTo: {}", e);
            Redirect::to(AUTH_REDIRECT_ANON.as_str()).into_response()
        }
    }
}
