use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::session::{ACCESS_TOKEN_TTL, SessionError, TokenResolver};
use crate::strategy::AccessToken;
use crate::utils::gen_random_string;

/// Access tokens kept in process memory.
pub struct InMemoryTokenStore {
    tokens: Mutex<HashMap<String, AccessToken>>,
    ttl: i64,
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self::new(*ACCESS_TOKEN_TTL)
    }
}

impl InMemoryTokenStore {
    /// `ttl` in seconds.
    pub fn new(ttl: i64) -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub async fn issue(&self, user_id: &str) -> Result<AccessToken, SessionError> {
        let token = AccessToken {
            id: gen_random_string(32)?,
            user_id: user_id.to_string(),
            ttl: self.ttl,
            created_at: Utc::now(),
        };
        self.tokens
            .lock()
            .await
            .insert(token.id.clone(), token.clone());
        Ok(token)
    }

    pub async fn revoke(&self, token_id: &str) -> bool {
        self.tokens.lock().await.remove(token_id).is_some()
    }
}

#[async_trait]
impl TokenResolver for InMemoryTokenStore {
    async fn resolve(&self, token_id: &str) -> Result<Option<AccessToken>, SessionError> {
        let mut tokens = self.tokens.lock().await;
        match tokens.get(token_id) {
            Some(token) if token.is_expired_at(Utc::now()) => {
                tokens.remove(token_id);
                Ok(None)
            }
            Some(token) => Ok(Some(token.clone())),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_issue_and_resolve() {
        let store = InMemoryTokenStore::new(60);
        let token = store.issue("u1").await.unwrap();

        let resolved = store.resolve(&token.id).await.unwrap().unwrap();
        assert_eq!(resolved.user_id, "u1");
        assert_eq!(resolved.ttl, 60);
    }

    #[tokio::test]
    async fn test_expired_token_not_resolved() {
        let store = InMemoryTokenStore::new(0);
        let token = store.issue("u1").await.unwrap();
        assert_eq!(store.resolve(&token.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_revoke() {
        let store = InMemoryTokenStore::new(60);
        let token = store.issue("u1").await.unwrap();
        assert!(store.revoke(&token.id).await);
        assert!(!store.revoke(&token.id).await);
        assert_eq!(store.resolve(&token.id).await.unwrap(), None);
    }
}
