//! MySQL connection settings for the refresh token store

use serde::{Deserialize, Serialize};

use super::{env_value, ConfigError};

/// Connection pool settings
///
/// Every field can be set from a `DATABASE_*` variable; see [`DatabaseConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `mysql://` connection URL
    pub url: String,

    /// Pool size upper bound
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection
    pub connect_timeout: u64,

    /// Seconds before an idle connection is closed
    pub idle_timeout: u64,

    /// Seconds before any connection is recycled
    pub max_lifetime: u64,

    /// Statements slower than this many milliseconds are logged at warn
    pub slow_query_threshold: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::from("mysql://localhost:3306/reelauth"),
            max_connections: 10,
            connect_timeout: 30,
            idle_timeout: 600,
            max_lifetime: 1800,
            slow_query_threshold: 1000,
        }
    }
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Reads `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS`, `DATABASE_CONNECT_TIMEOUT`,
    /// `DATABASE_IDLE_TIMEOUT`, `DATABASE_MAX_LIFETIME` and `DATABASE_SLOW_QUERY_MS`
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            url: env_value("DATABASE_URL")?.unwrap_or(defaults.url),
            max_connections: env_value("DATABASE_MAX_CONNECTIONS")?.unwrap_or(defaults.max_connections),
            connect_timeout: env_value("DATABASE_CONNECT_TIMEOUT")?.unwrap_or(defaults.connect_timeout),
            idle_timeout: env_value("DATABASE_IDLE_TIMEOUT")?.unwrap_or(defaults.idle_timeout),
            max_lifetime: env_value("DATABASE_MAX_LIFETIME")?.unwrap_or(defaults.max_lifetime),
            slow_query_threshold: env_value("DATABASE_SLOW_QUERY_MS")?
                .unwrap_or(defaults.slow_query_threshold),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.url.starts_with("mysql://") {
            return Err(ConfigError::Invalid {
                field: "database.url".to_string(),
                message: "must be a mysql:// URL".to_string(),
            });
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid {
                field: "database.max_connections".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_foreign_scheme() {
        let err = DatabaseConfig::new("postgres://localhost/reelauth").validate().unwrap_err();
        assert!(err.to_string().contains("database.url"));
    }

    #[test]
    fn test_validate_rejects_empty_pool() {
        let config = DatabaseConfig {
            max_connections: 0,
            ..DatabaseConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(DatabaseConfig::default().validate().is_ok());
    }
}
