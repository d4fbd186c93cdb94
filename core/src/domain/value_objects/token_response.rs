//! Token pair returned to callers after login or refresh.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::token::BEARER_SCHEME;

/// Access token plus refresh token
///
/// The refresh token is the plain value; only its hash is ever stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// Signed compact JWT
    pub access_token: String,

    /// Opaque single-use refresh token
    pub refresh_token: String,

    /// Always "Bearer"
    pub token_type: String,

    /// Access token expiration
    pub expires_at: DateTime<Utc>,
}

impl TokenResponse {
    pub fn new(access_token: String, refresh_token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: BEARER_SCHEME.to_string(),
            expires_at,
        }
    }

    /// Value for an `Authorization` header, e.g. `Bearer eyJ...`
    pub fn authorization_value(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}
