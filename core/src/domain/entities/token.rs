//! Token entities for JWT-based authentication.

use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::identity::Identity;

/// Access token expiration time (5 minutes)
pub const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 5;

/// Refresh token expiration time (7 days)
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

/// Number of random bytes in a refresh token (256 bits)
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Transport scheme label placed in front of access tokens
pub const BEARER_SCHEME: &str = "Bearer";

/// Claims structure for the access token payload
///
/// `role` is always serialized as an array with one entry per role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,

    /// User name
    pub name: String,

    /// Role names, order preserved
    #[serde(default)]
    pub role: Vec<String>,

    /// Group label
    #[serde(default)]
    pub group: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,
}

impl AccessClaims {
    /// Builds the claim set for an identity
    ///
    /// This is the only step shared by every credential strategy
    /// (bearer tokens and session cookies).
    pub fn for_identity(
        identity: &Identity,
        issued_at: DateTime<Utc>,
        expiration: DateTime<Utc>,
        issuer: &str,
        audience: &str,
    ) -> Self {
        Self {
            sub: identity.subject(),
            name: identity.user_name.clone(),
            role: identity.role_names.clone(),
            group: identity.group_label.clone(),
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: expiration.timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// Refresh token record owned by the persistence collaborator
///
/// One record per identity. Only the SHA-256 hash of the token is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRefreshToken {
    /// User ID this token belongs to
    pub user_id: i64,

    /// Hashed token value
    pub token_hash: String,

    /// Absolute expiration instant
    pub expires_at: DateTime<Utc>,

    /// When the current value was written (login or last rotation)
    pub rotated_at: DateTime<Utc>,
}

impl StoredRefreshToken {
    /// Creates a record from a plain refresh token
    pub fn new(user_id: i64, refresh_token: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            token_hash: hash_refresh_token(refresh_token),
            expires_at,
            rotated_at: Utc::now(),
        }
    }

    /// Checks whether the stored expiration has elapsed at `now`
    ///
    /// The record is still usable at exactly `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Constant-time comparison against a presented plain token
    pub fn matches(&self, presented: &str) -> bool {
        let presented_hash = hash_refresh_token(presented);
        constant_time_eq(self.token_hash.as_bytes(), presented_hash.as_bytes())
    }
}

/// Hashes a refresh token for storage
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
