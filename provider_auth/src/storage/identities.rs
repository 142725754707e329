use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::strategy::{
    Credentials, Identity, LoginOptions, LoginResult, Profile, StrategyError, User,
    UserIdentityStore,
};

use super::tokens::InMemoryTokenStore;

#[derive(Default)]
struct State {
    users: HashMap<String, User>,
    /// Keyed by `(provider, external id)`.
    identities: HashMap<(String, String), Identity>,
}

/// Users and linked identities kept in process memory. Logins issue tokens
/// from the shared token store; links do not.
pub struct InMemoryIdentityStore {
    state: Mutex<State>,
    tokens: Arc<InMemoryTokenStore>,
}

impl InMemoryIdentityStore {
    pub fn new(tokens: Arc<InMemoryTokenStore>) -> Self {
        tracing::info!("Creating new in-memory identity store");
        Self {
            state: Mutex::new(State::default()),
            tokens,
        }
    }

    pub async fn user(&self, user_id: &str) -> Option<User> {
        self.state.lock().await.users.get(user_id).cloned()
    }

    pub async fn identities_of(&self, user_id: &str) -> Vec<Identity> {
        let state = self.state.lock().await;
        let mut identities: Vec<_> = state
            .identities
            .values()
            .filter(|identity| identity.user_id == user_id)
            .cloned()
            .collect();
        identities.sort_by(|a, b| a.provider.cmp(&b.provider));
        identities
    }
}

#[async_trait]
impl UserIdentityStore for InMemoryIdentityStore {
    async fn login(
        &self,
        provider: &str,
        auth_scheme: &str,
        profile: Profile,
        credentials: Credentials,
        options: LoginOptions,
    ) -> Result<LoginResult, StrategyError> {
        let now = Utc::now();
        let key = (provider.to_string(), profile.id.clone());

        let (user, identity) = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;

            let user_id = match (state.identities.get(&key), options.link_user_id.as_deref()) {
                (Some(existing), Some(link_to)) if existing.user_id != link_to => {
                    return Err(StrategyError::Identity(format!(
                        "{provider} account {} is already linked to another user",
                        profile.id
                    )));
                }
                (Some(existing), _) => existing.user_id.clone(),
                (None, Some(link_to)) => {
                    if !state.users.contains_key(link_to) {
                        return Err(StrategyError::Identity(format!("user {link_to} not found")));
                    }
                    link_to.to_string()
                }
                (None, None) if options.auto_login => {
                    let user = User {
                        id: uuid::Uuid::new_v4().to_string(),
                        account: profile.emails.first().cloned(),
                        label: profile.display_name.clone(),
                    };
                    let id = user.id.clone();
                    state.users.insert(id.clone(), user);
                    id
                }
                (None, None) => {
                    return Err(StrategyError::Identity(format!(
                        "no local user for {provider} account {}",
                        profile.id
                    )));
                }
            };

            let identity = match state.identities.get(&key) {
                Some(existing) => Identity {
                    auth_scheme: auth_scheme.to_string(),
                    profile: profile.raw.clone(),
                    credentials,
                    updated_at: now,
                    ..existing.clone()
                },
                None => Identity {
                    id: uuid::Uuid::new_v4().to_string(),
                    provider: provider.to_string(),
                    auth_scheme: auth_scheme.to_string(),
                    external_id: profile.id.clone(),
                    user_id: user_id.clone(),
                    profile: profile.raw.clone(),
                    credentials,
                    created_at: now,
                    updated_at: now,
                },
            };
            state.identities.insert(key, identity.clone());

            let user = state
                .users
                .get(&user_id)
                .cloned()
                .ok_or_else(|| StrategyError::Identity(format!("user {user_id} not found")))?;
            (user, identity)
        };

        let access_token = if options.link_user_id.is_some() {
            None
        } else {
            Some(
                self.tokens
                    .issue(&user.id)
                    .await
                    .map_err(|e| StrategyError::Identity(e.to_string()))?,
            )
        };

        Ok(LoginResult {
            user,
            identity,
            access_token,
        })
    }
}
