//! Error types for token issuance, validation and refresh rotation

use thiserror::Error;

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Signing key missing or shorter than the algorithm requires.
    /// A configuration bug: raised at construction, never per request.
    #[error("Signing key error: {reason}")]
    SigningKey { reason: String },

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Invalid claims")]
    InvalidClaims,

    #[error("Token generation failed")]
    TokenGenerationFailed,

    #[error("Refresh rejected: {reason}")]
    RefreshRejected { reason: RefreshRejection },
}

impl TokenError {
    /// Whether this error means "the presented credential is not acceptable"
    pub fn is_unauthenticated(&self) -> bool {
        !matches!(
            self,
            TokenError::SigningKey { .. } | TokenError::TokenGenerationFailed
        )
    }
}

/// Why a refresh attempt was turned down
///
/// Callers should report all of these the same way ("unauthenticated");
/// the distinction exists for logs.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshRejection {
    #[error("no identity in presented access token")]
    NoIdentity,

    #[error("subject no longer exists")]
    UnknownSubject,

    #[error("refresh token mismatch")]
    TokenMismatch,

    #[error("refresh token expired")]
    TokenExpired,

    #[error("refresh token already rotated")]
    Superseded,

    #[error("refresh token store unavailable")]
    StoreUnavailable,
}
