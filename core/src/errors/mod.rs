//! Domain-specific error types and error handling.

mod types;

pub use types::{RefreshRejection, TokenError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// Whether the caller should answer "unauthenticated"
    ///
    /// Signature failures and refresh rejections are always recoverable by
    /// re-authenticating; they are never retried.
    pub fn is_unauthenticated(&self) -> bool {
        match self {
            DomainError::Unauthorized => true,
            DomainError::Token(err) => err.is_unauthenticated(),
            _ => false,
        }
    }

    /// Shorthand for a refresh rejection
    pub fn refresh_rejected(reason: RefreshRejection) -> Self {
        DomainError::Token(TokenError::RefreshRejected { reason })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
