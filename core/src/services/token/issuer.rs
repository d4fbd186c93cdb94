//! Access token issuance and refresh token generation

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, error};

use crate::domain::entities::identity::Identity;
use crate::domain::entities::token::{AccessClaims, REFRESH_TOKEN_BYTES};
use crate::domain::value_objects::TokenResponse;
use crate::errors::{DomainError, TokenError};
use crate::services::session::CredentialIssuer;

use super::signing::SigningContext;

/// Mints HS256 access tokens for already-authenticated identities
///
/// Holds only immutable state and is safe to share across tasks.
/// Issuance has no persistence side effects.
#[derive(Clone)]
pub struct TokenIssuer {
    signing: SigningContext,
    encoding_key: EncodingKey,
}

impl TokenIssuer {
    /// Creates an issuer after validating the signing key
    ///
    /// # Returns
    ///
    /// * `Err(TokenError::SigningKey)` - Key empty or shorter than 32 bytes
    pub fn new(signing: SigningContext) -> Result<Self, DomainError> {
        signing.validate()?;
        let encoding_key = signing.encoding_key();
        Ok(Self {
            signing,
            encoding_key,
        })
    }

    pub fn signing(&self) -> &SigningContext {
        &self.signing
    }

    /// Issues an access token expiring at `expiration`
    ///
    /// The claim set holds the subject id, user name, one `role` entry per
    /// role in order, and the group label. `iat` and `nbf` are now.
    ///
    /// # Arguments
    ///
    /// * `identity` - The authenticated identity
    /// * `expiration` - Must be after now
    /// * `refresh_token` - Passed through to the response unchanged
    pub fn issue(
        &self,
        identity: &Identity,
        expiration: DateTime<Utc>,
        refresh_token: &str,
    ) -> Result<TokenResponse, DomainError> {
        self.issue_at(identity, Utc::now(), expiration, refresh_token)
    }

    /// Same as [`issue`](Self::issue) with an explicit issuance instant
    pub fn issue_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
        expiration: DateTime<Utc>,
        refresh_token: &str,
    ) -> Result<TokenResponse, DomainError> {
        if expiration.timestamp() <= issued_at.timestamp() {
            debug!(user_id = identity.user_id, "Refusing to issue token that is already expired");
            return Err(TokenError::InvalidClaims.into());
        }

        let claims = AccessClaims::for_identity(
            identity,
            issued_at,
            expiration,
            &self.signing.issuer,
            &self.signing.audience,
        );
        let access_token = self.encode_claims(&claims)?;

        debug!(user_id = identity.user_id, jti = %claims.jti, "Access token issued");

        Ok(TokenResponse::new(
            access_token,
            refresh_token.to_string(),
            expiration,
        ))
    }

    /// Generates an opaque refresh token
    ///
    /// 32 bytes from the OS random source, standard base64 encoded
    /// (44 characters). Never derived from identity data.
    pub fn generate_refresh_token() -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        general_purpose::STANDARD.encode(bytes)
    }

    /// Encodes claims into a compact JWT
    pub(crate) fn encode_claims(&self, claims: &AccessClaims) -> Result<String, DomainError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "Failed to sign access token");
            DomainError::Token(TokenError::TokenGenerationFailed)
        })
    }
}

impl CredentialIssuer for TokenIssuer {
    type Credential = TokenResponse;

    /// Issues a bearer token pair with a freshly generated refresh token
    fn issue_credential(
        &self,
        identity: &Identity,
        expiration: DateTime<Utc>,
    ) -> Result<TokenResponse, DomainError> {
        let refresh_token = Self::generate_refresh_token();
        self.issue(identity, expiration, &refresh_token)
    }
}

/// Issues an access token with a per-call signing context
///
/// Validates the key on every call; long-running services should build a
/// [`TokenIssuer`] once instead.
pub fn issue_token(
    identity: &Identity,
    expiration: DateTime<Utc>,
    signing: &SigningContext,
    refresh_token: &str,
) -> Result<TokenResponse, DomainError> {
    TokenIssuer::new(signing.clone())?.issue(identity, expiration, refresh_token)
}
