//! Credential strategies
//!
//! Bearer tokens and cookie sessions are two independent implementations of
//! [`CredentialIssuer`]; they share only the claim-building step
//! ([`AccessClaims::for_identity`](crate::domain::entities::token::AccessClaims::for_identity)).

mod cookie;

#[cfg(test)]
mod tests;

pub use cookie::CookieSessionIssuer;

use chrono::{DateTime, Utc};

use crate::domain::entities::identity::Identity;
use crate::errors::DomainError;

/// Something that turns an authenticated identity into a credential
pub trait CredentialIssuer: Send + Sync {
    /// What the client receives
    type Credential;

    /// Issue a credential valid until `expiration`
    fn issue_credential(
        &self,
        identity: &Identity,
        expiration: DateTime<Utc>,
    ) -> Result<Self::Credential, DomainError>;
}
