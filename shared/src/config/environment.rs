//! Deployment environment detection

use serde::{Deserialize, Serialize};

use super::{env_value, ConfigError};

/// Where the token services run
///
/// Only production changes behavior: it refuses the built-in development
/// signing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Reads `APP_ENV`, defaulting to development when unset
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(env_value("APP_ENV")?.unwrap_or_default())
    }

    /// Base name of the optional TOML file layered over the defaults
    pub fn config_source(&self) -> String {
        format!("reelauth.{}", self)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            _ => Err(format!("expected development or production, got {}", s)),
        }
    }
}
