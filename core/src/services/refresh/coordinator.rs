//! Refresh coordinator implementation

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::domain::entities::claims::ClaimSet;
use crate::domain::entities::identity::Identity;
use crate::domain::value_objects::TokenResponse;
use crate::errors::{DomainError, RefreshRejection};
use crate::repositories::{TokenRepository, UserRepository};
use crate::services::token::{ClaimsValidator, TokenIssuer, TokenServiceConfig};

/// Orchestrates login issuance and refresh rotation
///
/// A refresh presents an (possibly expired) access token and the refresh
/// token issued with it. The pair is redeemed at most once: the new refresh
/// token is persisted with a compare-and-swap against the presented one.
pub struct RefreshCoordinator<T: TokenRepository, U: UserRepository> {
    issuer: TokenIssuer,
    token_repository: Arc<T>,
    user_repository: Arc<U>,
    config: TokenServiceConfig,
}

impl<T: TokenRepository, U: UserRepository> RefreshCoordinator<T, U> {
    /// Creates a coordinator
    ///
    /// # Returns
    ///
    /// * `Err(TokenError::SigningKey)` - The configured key is unusable
    /// * `Err(DomainError::Validation)` - A lifetime is out of range
    pub fn new(
        token_repository: Arc<T>,
        user_repository: Arc<U>,
        config: TokenServiceConfig,
    ) -> Result<Self, DomainError> {
        config.validate()?;
        let issuer = TokenIssuer::new(config.signing.clone())?;
        Ok(Self {
            issuer,
            token_repository,
            user_repository,
            config,
        })
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Issues the first token pair for a freshly authenticated identity
    ///
    /// Replaces any refresh token the identity already had.
    pub async fn login(&self, identity: &Identity) -> Result<TokenResponse, DomainError> {
        let now = Utc::now();
        let refresh_token = TokenIssuer::generate_refresh_token();
        let response = self.issuer.issue_at(
            identity,
            now,
            self.config.access_expiration(now)?,
            &refresh_token,
        )?;

        self.token_repository
            .save_refresh_token(
                identity.user_id,
                &refresh_token,
                self.config.refresh_expiration(now)?,
            )
            .await?;

        info!(user_id = identity.user_id, "Token pair issued on login");
        Ok(response)
    }

    /// Exchanges a presented token pair for a new one
    ///
    /// Steps: extract claims from the access token (signature only), load
    /// the stored record of the subject, check it matches and has not
    /// expired, re-read the current identity, mint a new pair and persist
    /// the new refresh token with a compare-and-swap.
    ///
    /// Every failure is a [`TokenError::RefreshRejected`](crate::errors::TokenError::RefreshRejected);
    /// storage errors are not retried.
    pub async fn refresh(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<TokenResponse, DomainError> {
        let claims = ClaimsValidator::extract_claims(access_token, self.config.signing.key());
        let user_id = claims
            .subject_id()
            .ok_or_else(|| reject(None, RefreshRejection::NoIdentity))?;

        let record = self
            .token_repository
            .find_refresh_token(user_id)
            .await
            .map_err(|e| store_failure(user_id, e))?
            .ok_or_else(|| reject(Some(user_id), RefreshRejection::TokenMismatch))?;

        let now = Utc::now();
        if !record.matches(refresh_token) {
            return Err(reject(Some(user_id), RefreshRejection::TokenMismatch));
        }
        if record.is_expired_at(now) {
            return Err(reject(Some(user_id), RefreshRejection::TokenExpired));
        }

        let identity = self
            .user_repository
            .find_identity(user_id)
            .await
            .map_err(|e| store_failure(user_id, e))?
            .ok_or_else(|| reject(Some(user_id), RefreshRejection::UnknownSubject))?;

        let new_refresh_token = TokenIssuer::generate_refresh_token();
        let response = self.issuer.issue_at(
            &identity,
            now,
            self.config.access_expiration(now)?,
            &new_refresh_token,
        )?;

        let refresh_expires_at = if self.config.sliding_refresh_expiry {
            self.config.refresh_expiration(now)?
        } else {
            record.expires_at
        };

        let rotated = self
            .token_repository
            .rotate_refresh_token(user_id, refresh_token, &new_refresh_token, refresh_expires_at, now)
            .await
            .map_err(|e| store_failure(user_id, e))?;
        if !rotated {
            return Err(reject(Some(user_id), RefreshRejection::Superseded));
        }

        info!(user_id, "Refresh token rotated");
        Ok(response)
    }

    /// Strictly verifies an access token for a live request
    ///
    /// Uses the configured signing context and clock skew leeway.
    pub fn verify_access_token(&self, access_token: &str) -> Result<ClaimSet, DomainError> {
        ClaimsValidator::verify_access_token_with_leeway(
            access_token,
            &self.config.signing,
            self.config.leeway_seconds,
        )
    }

    /// Drops the stored refresh token of a user (logout)
    ///
    /// Access tokens already issued stay valid until they expire.
    pub async fn revoke(&self, user_id: i64) -> Result<bool, DomainError> {
        let revoked = self.token_repository.revoke_refresh_token(user_id).await?;
        if revoked {
            info!(user_id, "Refresh token revoked");
        }
        Ok(revoked)
    }

    /// Deletes stored refresh tokens that have expired
    pub async fn purge_expired(&self) -> Result<usize, DomainError> {
        let deleted = self.token_repository.delete_expired_tokens(Utc::now()).await?;
        if deleted > 0 {
            info!(deleted, "Expired refresh tokens purged");
        }
        Ok(deleted)
    }
}

fn reject(user_id: Option<i64>, reason: RefreshRejection) -> DomainError {
    warn!(user_id, %reason, "Refresh rejected");
    DomainError::refresh_rejected(reason)
}

fn store_failure(user_id: i64, err: DomainError) -> DomainError {
    error!(user_id, error = %err, "Refresh token store failed");
    DomainError::refresh_rejected(RefreshRejection::StoreUnavailable)
}
