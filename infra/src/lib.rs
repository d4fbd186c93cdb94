//! # Infrastructure Layer
//!
//! Concrete implementations of the core repository traits:
//! - **Database**: MySQL refresh token store and identity lookup using SQLx
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

use std::sync::Arc;

use ra_core::errors::DomainError;
use ra_core::services::{RefreshCoordinator, TokenServiceConfig};
use ra_shared::config::AppConfig;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

#[cfg(feature = "mysql")]
use database::{DatabasePool, MySqlTokenRepository, MySqlUserRepository};

/// Refresh coordinator wired to the MySQL repositories
#[cfg(feature = "mysql")]
pub type MySqlRefreshCoordinator = RefreshCoordinator<MySqlTokenRepository, MySqlUserRepository>;

/// Infrastructure service container
#[cfg(feature = "mysql")]
#[derive(Clone)]
pub struct InfrastructureServices {
    pub config: AppConfig,
    pub pool: DatabasePool,
    pub token_repository: Arc<MySqlTokenRepository>,
    pub user_repository: Arc<MySqlUserRepository>,
}

#[cfg(feature = "mysql")]
impl InfrastructureServices {
    /// Builds a refresh coordinator from the loaded JWT settings
    pub fn refresh_coordinator(&self) -> Result<MySqlRefreshCoordinator, DomainError> {
        RefreshCoordinator::new(
            self.token_repository.clone(),
            self.user_repository.clone(),
            TokenServiceConfig::from(&self.config.auth.jwt),
        )
    }
}

/// Initialize infrastructure services
///
/// This function sets up:
/// - Configuration (defaults, config file, environment)
/// - The database connection pool and schema
/// - The MySQL repositories
#[cfg(feature = "mysql")]
pub async fn initialize() -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!("Initializing infrastructure services...");

    let config = load_config()?;

    let pool = DatabasePool::new(config.database.clone()).await?;
    pool.run_migrations().await?;

    let token_repository = Arc::new(MySqlTokenRepository::new(pool.get_pool().clone()));
    let user_repository = Arc::new(MySqlUserRepository::new(pool.get_pool().clone()));

    tracing::info!("Infrastructure services initialized successfully");

    Ok(InfrastructureServices {
        config,
        pool,
        token_repository,
        user_repository,
    })
}

/// Load and validate configuration
pub fn load_config() -> Result<AppConfig, InfrastructureError> {
    dotenvy::dotenv().ok(); // Load .env file if present

    AppConfig::load().map_err(|e| InfrastructureError::Config(e.to_string()))
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::Internal {
            message: err.to_string(),
        }
    }
}
