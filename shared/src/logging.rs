//! Tracing subscriber bootstrap
//!
//! Services embedding the token core call [`init_tracing`] once at startup.
//! `RUST_LOG` takes precedence over the configured filter.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{env_flag, env_value, ConfigError};

/// Subscriber settings, one field per knob [`init_tracing`] turns
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset (`info,ra_core=debug`)
    pub filter: String,

    pub format: LogFormat,

    /// ANSI colors in terminal output
    pub ansi: bool,

    /// Record file and line of each event
    pub source_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: String::from("info"),
            format: LogFormat::Compact,
            ansi: true,
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// Reads `LOG_FORMAT`, `LOG_SOURCE_LOCATION` and `NO_COLOR`
    ///
    /// Any value of `NO_COLOR` disables colors.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            format: env_value("LOG_FORMAT")?.unwrap_or(defaults.format),
            ansi: std::env::var_os("NO_COLOR").is_none(),
            source_location: env_flag("LOG_SOURCE_LOCATION")?.unwrap_or(defaults.source_location),
            ..defaults
        })
    }
}

/// Event output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("expected json, pretty or compact, got {}", s)),
        }
    }
}

/// Install the global tracing subscriber described by `config`
///
/// Returns `false` if a global subscriber was already installed, which
/// happens when several tests in one binary initialize logging.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    result.is_ok()
}
