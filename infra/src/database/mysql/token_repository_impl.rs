//! MySQL implementation of the TokenRepository trait.
//!
//! Refresh tokens are kept on the `users` row (`refresh_token`,
//! `refresh_token_expiration`). Only the SHA-256 hex digest is written.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use ra_core::domain::entities::token::{hash_refresh_token, StoredRefreshToken};
use ra_core::errors::DomainError;
use ra_core::repositories::TokenRepository;

/// MySQL implementation of TokenRepository
///
/// Rotation is a single conditional `UPDATE`, so the compare and the swap
/// happen inside one statement and concurrent rotations cannot both win.
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to StoredRefreshToken
    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<StoredRefreshToken, DomainError> {
        let expires_at: DateTime<Utc> = row
            .try_get("refresh_token_expiration")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get refresh_token_expiration: {}", e) })?;
        let rotated_at: Option<DateTime<Utc>> = row
            .try_get("refresh_token_rotated_at")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get refresh_token_rotated_at: {}", e) })?;

        Ok(StoredRefreshToken {
            user_id: row
                .try_get("id")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get id: {}", e) })?,
            token_hash: row
                .try_get("refresh_token")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get refresh_token: {}", e) })?,
            expires_at,
            rotated_at: rotated_at.unwrap_or(expires_at),
        })
    }
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn find_refresh_token(&self, user_id: i64) -> Result<Option<StoredRefreshToken>, DomainError> {
        let query = r#"
            SELECT id, refresh_token, refresh_token_expiration, refresh_token_rotated_at
            FROM users
            WHERE id = ? AND refresh_token IS NOT NULL AND refresh_token_expiration IS NOT NULL
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to find refresh token: {}", e) })?;

        match result {
            Some(row) => Ok(Some(Self::row_to_token(&row)?)),
            None => Ok(None),
        }
    }

    async fn save_refresh_token(
        &self,
        user_id: i64,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let query = r#"
            UPDATE users
            SET refresh_token = ?, refresh_token_expiration = ?, refresh_token_rotated_at = ?
            WHERE id = ?
        "#;

        let result = sqlx::query(query)
            .bind(hash_refresh_token(refresh_token))
            .bind(expires_at)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to save refresh token: {}", e) })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound {
                resource: format!("user {}", user_id),
            });
        }

        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        user_id: i64,
        expected: &str,
        replacement: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE users
            SET refresh_token = ?, refresh_token_expiration = ?, refresh_token_rotated_at = ?
            WHERE id = ? AND refresh_token = ? AND refresh_token_expiration >= ?
        "#;

        let result = sqlx::query(query)
            .bind(hash_refresh_token(replacement))
            .bind(expires_at)
            .bind(now)
            .bind(user_id)
            .bind(hash_refresh_token(expected))
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to rotate refresh token: {}", e) })?;

        Ok(result.rows_affected() == 1)
    }

    async fn revoke_refresh_token(&self, user_id: i64) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE users
            SET refresh_token = NULL, refresh_token_expiration = NULL, refresh_token_rotated_at = NULL
            WHERE id = ? AND refresh_token IS NOT NULL
        "#;

        let result = sqlx::query(query)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to revoke refresh token: {}", e) })?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let query = r#"
            UPDATE users
            SET refresh_token = NULL, refresh_token_expiration = NULL, refresh_token_rotated_at = NULL
            WHERE refresh_token_expiration < ?
        "#;

        let result = sqlx::query(query)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to delete expired tokens: {}", e) })?;

        Ok(result.rows_affected() as usize)
    }
}
