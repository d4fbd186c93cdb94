//! # Reelauth Core
//!
//! Token-based authentication and session renewal.
//! This crate mints signed access tokens for an already-authenticated identity,
//! extracts claims from presented tokens, and rotates single-use refresh tokens
//! through repository interfaces implemented by the infrastructure layer.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{
    AccessClaims, Claim, ClaimSet, Identity, SameSite, SessionCookie, StoredRefreshToken,
    TokenResponse,
};
pub use errors::{DomainError, DomainResult, RefreshRejection, TokenError};
pub use repositories::{InMemoryTokenRepository, InMemoryUserRepository, TokenRepository, UserRepository};
pub use services::{
    issue_token, ClaimsValidator, CookieSessionIssuer, CredentialIssuer, RefreshCoordinator,
    SigningContext, TokenIssuer, TokenServiceConfig,
};
