//! Signing context: HMAC key plus issuer and audience

use std::fmt;

use jsonwebtoken::{DecodingKey, EncodingKey};
use ra_shared::config::MIN_SECRET_BYTES;

use crate::errors::TokenError;

/// Minimum HS256 key length in bytes (256 bits)
pub const MIN_KEY_BYTES: usize = MIN_SECRET_BYTES;

/// Key material and the issuer/audience written into every token
///
/// The key is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningContext {
    security_key: Vec<u8>,
    pub issuer: String,
    pub audience: String,
}

impl SigningContext {
    pub fn new(
        security_key: impl AsRef<[u8]>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            security_key: security_key.as_ref().to_vec(),
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// Raw key bytes
    pub fn key(&self) -> &[u8] {
        &self.security_key
    }

    /// Rejects empty keys and keys shorter than [`MIN_KEY_BYTES`]
    pub fn validate(&self) -> Result<(), TokenError> {
        if self.security_key.is_empty() {
            return Err(TokenError::SigningKey {
                reason: "signing key is empty".to_string(),
            });
        }
        if self.security_key.len() < MIN_KEY_BYTES {
            return Err(TokenError::SigningKey {
                reason: format!(
                    "signing key must be at least {} bytes, got {}",
                    MIN_KEY_BYTES,
                    self.security_key.len()
                ),
            });
        }
        Ok(())
    }

    pub(crate) fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.security_key)
    }

    pub(crate) fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.security_key)
    }
}

impl fmt::Debug for SigningContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningContext")
            .field("security_key", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}
