//! Cookie-based sign-in

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, EncodingKey, Header, Validation};
use ra_shared::config::{SessionConfig, MAX_LIFETIME_SECONDS};
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::domain::entities::claims::ClaimSet;
use crate::domain::entities::identity::Identity;
use crate::domain::entities::token::AccessClaims;
use crate::domain::value_objects::{SameSite, SessionCookie};
use crate::errors::{DomainError, TokenError};
use crate::services::token::{SigningContext, DEFAULT_LEEWAY_SECONDS};

use super::CredentialIssuer;

/// Issues session cookies carrying an HS256 ticket over the identity claims
///
/// The ticket is validated in full (lifetime included) when read back.
pub struct CookieSessionIssuer {
    signing: SigningContext,
    encoding_key: EncodingKey,
    cookie_name: String,
    path: String,
    secure: bool,
    http_only: bool,
    same_site: SameSite,
    lifetime: Duration,
}

impl CookieSessionIssuer {
    /// Creates a cookie issuer
    ///
    /// Fails on a short signing key, an unknown `SameSite` value or a
    /// lifetime outside `1..=MAX_LIFETIME_SECONDS`.
    pub fn new(signing: SigningContext, session: &SessionConfig) -> Result<Self, DomainError> {
        signing.validate()?;
        let same_site = session
            .same_site
            .parse::<SameSite>()
            .map_err(|message| DomainError::Validation { message })?;
        let lifetime = Some(session.lifetime)
            .filter(|seconds| (1..=MAX_LIFETIME_SECONDS).contains(seconds))
            .and_then(Duration::try_seconds)
            .ok_or_else(|| DomainError::Validation {
                message: format!("Session lifetime out of range: {}", session.lifetime),
            })?;

        let encoding_key = signing.encoding_key();
        Ok(Self {
            signing,
            encoding_key,
            cookie_name: session.cookie_name.clone(),
            path: session.path.clone(),
            secure: session.secure,
            http_only: session.http_only,
            same_site,
            lifetime,
        })
    }

    /// Signs an identity in
    ///
    /// Without `expiration` the ticket lives for the configured session
    /// lifetime. Non-persistent cookies carry no `Expires` attribute, so the
    /// browser drops them when it closes.
    pub fn sign_in(
        &self,
        identity: &Identity,
        expiration: Option<DateTime<Utc>>,
        persistent: bool,
    ) -> Result<SessionCookie, DomainError> {
        let now = Utc::now();
        let expires_at = match expiration {
            Some(expiration) => expiration,
            None => now
                .checked_add_signed(self.lifetime)
                .ok_or(TokenError::InvalidClaims)?,
        };
        if expires_at.timestamp() <= now.timestamp() {
            return Err(TokenError::InvalidClaims.into());
        }

        let claims = AccessClaims::for_identity(
            identity,
            now,
            expires_at,
            &self.signing.issuer,
            &self.signing.audience,
        );
        let ticket = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "Failed to sign session ticket");
            DomainError::Token(TokenError::TokenGenerationFailed)
        })?;

        info!(user_id = identity.user_id, persistent, "Session cookie issued");

        Ok(self.cookie(ticket, persistent.then_some(expires_at)))
    }

    /// An empty cookie that has already expired, replacing the session cookie
    pub fn sign_out(&self) -> SessionCookie {
        self.cookie(String::new(), Some(DateTime::<Utc>::UNIX_EPOCH))
    }

    /// Reads the claims of a session ticket
    ///
    /// Returns an empty set for anything not signed by this issuer, issued
    /// for another audience, or expired.
    pub fn read_session(&self, cookie_value: &str) -> ClaimSet {
        let ticket = cookie_value.trim();
        if ticket.is_empty() {
            return ClaimSet::empty();
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.signing.issuer]);
        validation.set_audience(&[&self.signing.audience]);
        validation.leeway = DEFAULT_LEEWAY_SECONDS;

        match decode::<Map<String, Value>>(ticket, &self.signing.decoding_key(), &validation) {
            Ok(data) => ClaimSet::from_payload(data.claims),
            Err(e) => {
                debug!(error = %e, "Session ticket rejected");
                ClaimSet::empty()
            }
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn cookie(&self, value: String, expires: Option<DateTime<Utc>>) -> SessionCookie {
        SessionCookie {
            name: self.cookie_name.clone(),
            value,
            path: self.path.clone(),
            expires,
            secure: self.secure,
            http_only: self.http_only,
            same_site: self.same_site,
        }
    }
}

impl CredentialIssuer for CookieSessionIssuer {
    type Credential = SessionCookie;

    /// Issues a persistent session cookie
    fn issue_credential(
        &self,
        identity: &Identity,
        expiration: DateTime<Utc>,
    ) -> Result<SessionCookie, DomainError> {
        self.sign_in(identity, Some(expiration), true)
    }
}
