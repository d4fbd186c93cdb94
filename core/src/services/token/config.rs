//! Configuration for the token services

use chrono::{DateTime, Duration, Utc};
use ra_shared::config::{JwtConfig, MAX_LIFETIME_SECONDS};

use super::signing::SigningContext;
use super::validator::DEFAULT_LEEWAY_SECONDS;
use crate::errors::{DomainError, DomainResult};

/// Configuration for token issuance and refresh rotation
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Key, issuer and audience
    pub signing: SigningContext,
    /// Access token lifetime in seconds
    pub access_token_expiry_seconds: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_expiry_seconds: i64,
    /// Renew the refresh expiry on every rotation instead of keeping the login expiry
    pub sliding_refresh_expiry: bool,
    /// Clock skew tolerated by strict verification
    pub leeway_seconds: u64,
}

impl TokenServiceConfig {
    pub fn new(signing: SigningContext) -> Self {
        Self {
            signing,
            ..Self::default()
        }
    }

    /// Checks both lifetimes are in `1..=MAX_LIFETIME_SECONDS`
    pub fn validate(&self) -> DomainResult<()> {
        lifetime("Access token", self.access_token_expiry_seconds)?;
        lifetime("Refresh token", self.refresh_token_expiry_seconds)?;
        Ok(())
    }

    pub fn access_token_lifetime(&self) -> DomainResult<Duration> {
        lifetime("Access token", self.access_token_expiry_seconds)
    }

    pub fn refresh_token_lifetime(&self) -> DomainResult<Duration> {
        lifetime("Refresh token", self.refresh_token_expiry_seconds)
    }

    /// Expiration of an access token issued at `now`
    pub fn access_expiration(&self, now: DateTime<Utc>) -> DomainResult<DateTime<Utc>> {
        expiration_after(now, self.access_token_lifetime()?)
    }

    /// Expiration of a refresh token written at `now`
    pub fn refresh_expiration(&self, now: DateTime<Utc>) -> DomainResult<DateTime<Utc>> {
        expiration_after(now, self.refresh_token_lifetime()?)
    }
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::from(&JwtConfig::default())
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(config: &JwtConfig) -> Self {
        Self {
            signing: SigningContext::new(
                config.secret.as_bytes(),
                config.issuer.clone(),
                config.audience.clone(),
            ),
            access_token_expiry_seconds: config.access_token_expiry,
            refresh_token_expiry_seconds: config.refresh_token_expiry,
            sliding_refresh_expiry: config.sliding_refresh_expiry,
            leeway_seconds: DEFAULT_LEEWAY_SECONDS,
        }
    }
}

fn lifetime(name: &str, seconds: i64) -> DomainResult<Duration> {
    if !(1..=MAX_LIFETIME_SECONDS).contains(&seconds) {
        return Err(DomainError::Validation {
            message: format!(
                "{} lifetime must be between 1 and {} seconds, got {}",
                name, MAX_LIFETIME_SECONDS, seconds
            ),
        });
    }
    Duration::try_seconds(seconds).ok_or_else(|| DomainError::Validation {
        message: format!("{} lifetime out of range: {}", name, seconds),
    })
}

fn expiration_after(now: DateTime<Utc>, lifetime: Duration) -> DomainResult<DateTime<Utc>> {
    now.checked_add_signed(lifetime)
        .ok_or_else(|| DomainError::Validation {
            message: "Token expiration out of range".to_string(),
        })
}
