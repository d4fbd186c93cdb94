//! Token repository trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::token::StoredRefreshToken;
use crate::errors::DomainError;

/// Repository trait for per-identity refresh token records
///
/// Each identity has at most one refresh token. Implementations receive
/// plain tokens and must hash them before storage
/// (see [`hash_refresh_token`](crate::domain::entities::token::hash_refresh_token)).
///
/// # Security Considerations
/// - Tokens are hashed before storage
/// - Rotation must be an atomic compare-and-swap so that a token can be
///   redeemed at most once, even under concurrent requests
/// - Expired tokens should be periodically cleaned up
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Find the refresh token record of a user
    ///
    /// # Returns
    /// * `Ok(Some(StoredRefreshToken))` - Record found
    /// * `Ok(None)` - The user has no refresh token
    /// * `Err(DomainError)` - Storage error occurred
    async fn find_refresh_token(&self, user_id: i64) -> Result<Option<StoredRefreshToken>, DomainError>;

    /// Store a refresh token for a user, replacing any previous one
    ///
    /// Used on login. Unconditional.
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::{Duration, Utc};
    /// # use ra_core::repositories::TokenRepository;
    /// # async fn example(repo: &impl TokenRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let expires_at = Utc::now() + Duration::days(7);
    /// repo.save_refresh_token(7, "plain_refresh_token", expires_at).await?;
    /// # Ok(())
    /// # }
    /// ```
    async fn save_refresh_token(
        &self,
        user_id: i64,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    /// Atomically replace `expected` with `replacement`
    ///
    /// Succeeds only when the stored token still equals `expected` and the
    /// stored expiration is not before `now`. The check and the write must
    /// not be separable.
    ///
    /// # Returns
    /// * `Ok(true)` - The token was rotated
    /// * `Ok(false)` - The stored token changed, expired or vanished
    /// * `Err(DomainError)` - Storage error occurred
    async fn rotate_refresh_token(
        &self,
        user_id: i64,
        expected: &str,
        replacement: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Drop the refresh token of a user
    ///
    /// # Returns
    /// * `Ok(true)` - A token was removed
    /// * `Ok(false)` - The user had no token
    async fn revoke_refresh_token(&self, user_id: i64) -> Result<bool, DomainError>;

    /// Delete records whose expiration is before `now`
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records deleted
    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;

    /// Check if a plain token is the current, unexpired token of a user
    async fn is_token_valid(
        &self,
        user_id: i64,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        match self.find_refresh_token(user_id).await? {
            Some(record) => Ok(record.matches(refresh_token) && !record.is_expired_at(now)),
            None => Ok(false),
        }
    }
}
