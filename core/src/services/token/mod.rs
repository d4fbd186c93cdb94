//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - Signing context validation (HS256 key length)
//! - Access token issuance and refresh token generation
//! - Claim extraction for the refresh path and strict verification for live requests

mod config;
mod issuer;
mod signing;
mod validator;


pub use config::TokenServiceConfig;
pub use issuer::{issue_token, TokenIssuer};
pub use signing::{SigningContext, MIN_KEY_BYTES};
pub use validator::{strip_bearer, ClaimsValidator, DEFAULT_LEEWAY_SECONDS};
