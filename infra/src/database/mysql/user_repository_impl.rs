//! MySQL implementation of the UserRepository trait.

use async_trait::async_trait;
use sqlx::{MySqlPool, Row};

use ra_core::domain::entities::identity::Identity;
use ra_core::errors::DomainError;
use ra_core::repositories::UserRepository;

/// MySQL implementation of UserRepository
///
/// Only active users resolve to an identity. Roles come back in the order
/// they were assigned.
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    /// Create a new MySQL user repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn find_role_names(&self, user_id: i64) -> Result<Vec<String>, DomainError> {
        let query = r#"
            SELECT r.name
            FROM user_roles ur
            INNER JOIN roles r ON r.id = ur.role_id
            WHERE ur.user_id = ?
            ORDER BY ur.id
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to find user roles: {}", e) })?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("name")
                    .map_err(|e| DomainError::Internal { message: format!("Failed to get role name: {}", e) })
            })
            .collect()
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_identity(&self, user_id: i64) -> Result<Option<Identity>, DomainError> {
        let query = r#"
            SELECT u.id, u.user_name, g.title AS group_title
            FROM users u
            LEFT JOIN `groups` g ON g.id = u.group_id
            WHERE u.id = ? AND u.is_active = TRUE
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to find user: {}", e) })?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user_name: String = row
            .try_get("user_name")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get user_name: {}", e) })?;
        let group_title: Option<String> = row
            .try_get("group_title")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get group_title: {}", e) })?;
        let roles = self.find_role_names(user_id).await?;

        Ok(Some(
            Identity::new(user_id, user_name)
                .with_roles(roles)
                .with_group(group_title.unwrap_or_default()),
        ))
    }
}
