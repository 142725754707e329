use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use http::HeaderMap;
use tokio::sync::Mutex;

use crate::provider::CookieSpec;
use crate::session::{
    SESSION_COOKIE_MAX_AGE, SESSION_COOKIE_NAME, SessionError, SessionHandle, SessionManager,
};
use crate::strategy::User;
use crate::utils::{cookie_value, gen_random_string, header_set_cookie};

#[derive(Debug, Clone)]
struct StoredSession {
    user_id: Option<String>,
    return_to: Option<String>,
    expires_at: DateTime<Utc>,
}

/// Process-local session store keyed by a random cookie value.
pub struct InMemorySessionManager {
    sessions: Mutex<HashMap<String, StoredSession>>,
    cookie: CookieSpec,
    ttl: Duration,
}

impl InMemorySessionManager {
    pub fn new(secure: bool) -> Self {
        tracing::info!("Creating new in-memory session store");
        let max_age = *SESSION_COOKIE_MAX_AGE as i64;
        Self {
            sessions: Mutex::new(HashMap::new()),
            cookie: CookieSpec {
                name: SESSION_COOKIE_NAME.clone(),
                path: "/".to_string(),
                max_age_ms: Some(max_age * 1000),
                http_only: true,
                signed: false,
                secure,
                domain: None,
            },
            ttl: Duration::seconds(max_age),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie.name
    }

    /// Move the session under a fresh id, or open a new one.
    async fn renew(
        &self,
        current: Option<&str>,
        update: impl FnOnce(&mut StoredSession),
    ) -> Result<SessionHandle, SessionError> {
        let id = gen_random_string(32)?;
        let now = Utc::now();

        let mut sessions = self.sessions.lock().await;
        let mut session = current
            .and_then(|current| sessions.remove(current))
            .filter(|s| s.expires_at > now)
            .unwrap_or(StoredSession {
                user_id: None,
                return_to: None,
                expires_at: now,
            });
        sessions.retain(|_, s| s.expires_at > now);
        session.expires_at = now + self.ttl;
        update(&mut session);
        sessions.insert(id.clone(), session);
        drop(sessions);

        let mut headers = HeaderMap::new();
        header_set_cookie(&mut headers, &self.cookie, &id)?;
        Ok(SessionHandle { id, headers })
    }

    async fn live(&self, session_id: &str) -> Option<StoredSession> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(session_id) {
            Some(session) if session.expires_at > Utc::now() => Some(session.clone()),
            Some(_) => {
                sessions.remove(session_id);
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl SessionManager for InMemorySessionManager {
    async fn session_id(&self, headers: &HeaderMap) -> Option<String> {
        let id = cookie_value(headers, &self.cookie.name)?;
        self.live(&id).await.map(|_| id)
    }

    async fn establish(
        &self,
        current: Option<&str>,
        user: &User,
    ) -> Result<SessionHandle, SessionError> {
        let user_id = user.id.clone();
        let handle = self
            .renew(current, move |session| session.user_id = Some(user_id))
            .await?;
        tracing::debug!("Established session for user {}", user.id);
        Ok(handle)
    }

    async fn take_return_to(&self, session_id: &str) -> Result<Option<String>, SessionError> {
        let mut sessions = self.sessions.lock().await;
        Ok(sessions
            .get_mut(session_id)
            .and_then(|session| session.return_to.take()))
    }

    async fn remember_return_to(
        &self,
        current: Option<&str>,
        location: &str,
    ) -> Result<SessionHandle, SessionError> {
        let location = location.to_string();
        self.renew(current, move |session| session.return_to = Some(location))
            .await
    }

    async fn user_id(&self, session_id: &str) -> Result<Option<String>, SessionError> {
        Ok(self.live(session_id).await.and_then(|s| s.user_id))
    }
}
