//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Signing key, token lifetimes and session cookie settings
//! - `database` - MySQL connection pool settings
//! - `environment` - Deployment environment detection
//!
//! Logging settings live next to the subscriber in [`crate::logging`].

pub mod auth;
pub mod database;
pub mod environment;

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export commonly used types
pub use auth::{AuthConfig, JwtConfig, SessionConfig, MAX_LIFETIME_SECONDS, MIN_SECRET_BYTES};
pub use database::DatabaseConfig;
pub use environment::Environment;
pub use crate::logging::{LogFormat, LoggingConfig};

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration value for {field}: {message}")]
    Invalid { field: String, message: String },
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            auth: AuthConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables only
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            environment: Environment::from_env()?,
            auth: AuthConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Load layered configuration
    ///
    /// Sources, later ones overriding earlier ones:
    /// 1. built-in defaults overridden by plain variables (`JWT_SECRET`, `DATABASE_URL`, ...)
    /// 2. the environment's TOML file (e.g. `reelauth.production.toml`), if present
    /// 3. `APP__`-prefixed environment variables (`APP__AUTH__JWT__ISSUER=api`)
    ///
    /// The result is validated before it is returned.
    pub fn load() -> Result<Self, ConfigError> {
        let base = Self::from_env()?;
        let file_name = base.environment.config_source();
        let defaults = config::Config::try_from(&base)?;

        let loaded: AppConfig = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(&file_name).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        tracing::debug!(environment = %loaded.environment, "Configuration loaded");
        Ok(loaded)
    }

    /// Validate cross-section invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth.validate()?;
        self.database.validate()?;
        if self.environment.is_production() && self.auth.jwt.is_using_default_secret() {
            return Err(ConfigError::Invalid {
                field: "auth.jwt.secret".to_string(),
                message: "the development secret must not be used in production".to_string(),
            });
        }
        Ok(())
    }
}

/// Reads and parses an environment variable, `None` when unset
pub(crate) fn env_value<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                field: key.to_string(),
                message: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

/// Reads a boolean flag accepting `1/0`, `true/false` and `yes/no`
pub(crate) fn env_flag(key: &str) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = env_value::<String>(key)? else {
        return Ok(None);
    };
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(Some(true)),
        "0" | "false" | "no" => Ok(Some(false)),
        _ => Err(ConfigError::Invalid {
            field: key.to_string(),
            message: format!("expected a boolean, got {}", raw),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_rejects_default_secret() {
        let config = AppConfig {
            environment: Environment::Production,
            ..AppConfig::default()
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("auth.jwt.secret"));
    }

    #[test]
    fn test_production_accepts_custom_secret() {
        let mut config = AppConfig {
            environment: Environment::Production,
            ..AppConfig::default()
        };
        config.auth.jwt = JwtConfig::new("a-production-secret-of-sufficient-length-000");

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_value_parsing() {
        std::env::set_var("REELAUTH_TEST_POOL_SIZE", " 12 ");
        assert_eq!(env_value::<u32>("REELAUTH_TEST_POOL_SIZE").unwrap(), Some(12));

        std::env::set_var("REELAUTH_TEST_POOL_SIZE", "twelve");
        let err = env_value::<u32>("REELAUTH_TEST_POOL_SIZE").unwrap_err();
        assert!(err.to_string().contains("REELAUTH_TEST_POOL_SIZE"));
        std::env::remove_var("REELAUTH_TEST_POOL_SIZE");

        assert_eq!(env_value::<u32>("REELAUTH_TEST_UNSET").unwrap(), None);
    }

    #[test]
    fn test_env_flag_parsing() {
        std::env::set_var("REELAUTH_TEST_FLAG", "Yes");
        assert_eq!(env_flag("REELAUTH_TEST_FLAG").unwrap(), Some(true));
        std::env::set_var("REELAUTH_TEST_FLAG", "maybe");
        assert!(env_flag("REELAUTH_TEST_FLAG").is_err());
        std::env::remove_var("REELAUTH_TEST_FLAG");
    }

    #[test]
    fn test_validate_covers_session_and_database() {
        let mut config = AppConfig::default();
        config.auth.session.lifetime = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.database.url = "sqlite://reelauth.db".to_string();
        assert!(config.validate().is_err());
    }
}
