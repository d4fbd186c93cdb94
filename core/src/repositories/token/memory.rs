//! In-memory implementation of TokenRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::token::{hash_refresh_token, StoredRefreshToken};
use crate::errors::DomainError;

use super::r#trait::TokenRepository;

/// Token repository backed by a map keyed by user id
///
/// Every mutation takes the write lock, which makes rotation an atomic
/// compare-and-swap. Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct InMemoryTokenRepository {
    tokens: Arc<RwLock<HashMap<i64, StoredRefreshToken>>>,
}

impl InMemoryTokenRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn find_refresh_token(&self, user_id: i64) -> Result<Option<StoredRefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(&user_id).cloned())
    }

    async fn save_refresh_token(
        &self,
        user_id: i64,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut tokens = self.tokens.write().await;
        tokens.insert(user_id, StoredRefreshToken::new(user_id, refresh_token, expires_at));
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        user_id: i64,
        expected: &str,
        replacement: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(&user_id) {
            Some(record) if record.matches(expected) && !record.is_expired_at(now) => {
                record.token_hash = hash_refresh_token(replacement);
                record.expires_at = expires_at;
                record.rotated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_refresh_token(&self, user_id: i64) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;
        Ok(tokens.remove(&user_id).is_some())
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let initial_count = tokens.len();

        tokens.retain(|_, record| !record.is_expired_at(now));

        Ok(initial_count - tokens.len())
    }
}
