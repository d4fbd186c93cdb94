//! Shared configuration and bootstrap utilities for Reelauth
//!
//! This crate provides functionality used by every other crate in the workspace:
//! - Configuration types (JWT, session cookie, database, environment, logging)
//! - Configuration loading from `.env`, TOML files and environment variables
//! - Tracing subscriber initialization

pub mod config;
pub mod logging;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, ConfigError, DatabaseConfig, Environment, JwtConfig, LoggingConfig,
    SessionConfig,
};
pub use logging::init_tracing;
