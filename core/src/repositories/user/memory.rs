//! In-memory implementation of UserRepository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::identity::Identity;
use crate::errors::DomainError;

use super::r#trait::UserRepository;

/// Identity store backed by a map keyed by user id
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<i64, Identity>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an identity
    pub async fn upsert(&self, identity: Identity) {
        self.users.write().await.insert(identity.user_id, identity);
    }

    /// Remove an identity, returning it if present
    pub async fn remove(&self, user_id: i64) -> Option<Identity> {
        self.users.write().await.remove(&user_id)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_identity(&self, user_id: i64) -> Result<Option<Identity>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(&user_id).cloned())
    }
}
