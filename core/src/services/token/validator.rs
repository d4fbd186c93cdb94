//! Claim extraction and strict access token verification

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::entities::claims::ClaimSet;
use crate::domain::entities::token::BEARER_SCHEME;
use crate::errors::{DomainError, TokenError};

use super::signing::{SigningContext, MIN_KEY_BYTES};

/// Clock skew tolerated by [`ClaimsValidator::verify_access_token`]
pub const DEFAULT_LEEWAY_SECONDS: u64 = 60;

/// Reads claims out of presented access tokens
pub struct ClaimsValidator;

impl ClaimsValidator {
    /// Extracts the claim set of a token after checking its signature only
    ///
    /// Lifetime, issuer and audience are NOT checked, so expired tokens
    /// still yield their claims. This is what the refresh flow needs and
    /// makes the result unfit for authorizing live requests; use
    /// [`verify_access_token`](Self::verify_access_token) for that.
    ///
    /// A leading `Bearer ` label is stripped. Any failure (bad signature,
    /// malformed token, wrong algorithm, short key) yields an empty set.
    pub fn extract_claims(token: &str, signing_key: &[u8]) -> ClaimSet {
        let token = strip_bearer(token);
        if token.is_empty() {
            debug!("No token presented");
            return ClaimSet::empty();
        }
        if signing_key.len() < MIN_KEY_BYTES {
            debug!("Signing key below minimum length, refusing to extract claims");
            return ClaimSet::empty();
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        match decode::<Map<String, Value>>(token, &DecodingKey::from_secret(signing_key), &validation) {
            Ok(data) => ClaimSet::from_payload(data.claims),
            Err(e) => {
                debug!(error = %e, "Token rejected during claim extraction");
                ClaimSet::empty()
            }
        }
    }

    /// Verifies a token for a live request
    ///
    /// Checks signature, issuer, audience, `exp` and `nbf` with
    /// [`DEFAULT_LEEWAY_SECONDS`] of clock skew.
    pub fn verify_access_token(token: &str, signing: &SigningContext) -> Result<ClaimSet, DomainError> {
        Self::verify_access_token_with_leeway(token, signing, DEFAULT_LEEWAY_SECONDS)
    }

    pub fn verify_access_token_with_leeway(
        token: &str,
        signing: &SigningContext,
        leeway_seconds: u64,
    ) -> Result<ClaimSet, DomainError> {
        signing.validate()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&signing.issuer]);
        validation.set_audience(&[&signing.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = leeway_seconds;

        let data = decode::<Map<String, Value>>(strip_bearer(token), &signing.decoding_key(), &validation)
            .map_err(|e| {
                debug!(error = %e, "Access token verification failed");
                DomainError::Token(map_jwt_error(e.kind()))
            })?;

        Ok(ClaimSet::from_payload(data.claims))
    }
}

/// Removes a leading `Bearer` scheme label (any case) and surrounding whitespace
pub fn strip_bearer(token: &str) -> &str {
    let token = token.trim();
    match token.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => rest.trim_start(),
        _ => token,
    }
}

fn map_jwt_error(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::ExpiredSignature => TokenError::TokenExpired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => TokenError::InvalidClaims,
        _ => TokenError::InvalidTokenFormat,
    }
}
