//! Domain entities: identities, claims and stored refresh tokens.

pub mod claims;
pub mod identity;
pub mod token;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use claims::{claim_types, Claim, ClaimSet};
pub use identity::Identity;
pub use token::{
    hash_refresh_token, AccessClaims, StoredRefreshToken,
    ACCESS_TOKEN_EXPIRY_MINUTES, BEARER_SCHEME, REFRESH_TOKEN_BYTES, REFRESH_TOKEN_EXPIRY_DAYS,
};
