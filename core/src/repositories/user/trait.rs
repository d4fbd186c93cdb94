//! User repository trait for looking up current identities.

use async_trait::async_trait;

use crate::domain::entities::identity::Identity;
use crate::errors::DomainError;

/// Read access to the identity store owned by the surrounding service
///
/// The refresh flow re-reads the identity on every rotation so that role
/// and group changes reach the next access token.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find the current identity of a user
    ///
    /// # Returns
    /// * `Ok(Some(Identity))` - User found, with roles in stored order
    /// * `Ok(None)` - No such user
    /// * `Err(DomainError)` - Storage error occurred
    async fn find_identity(&self, user_id: i64) -> Result<Option<Identity>, DomainError>;
}
