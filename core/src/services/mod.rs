//! Business services containing domain logic and use cases.

pub mod refresh;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use refresh::RefreshCoordinator;
pub use session::{CookieSessionIssuer, CredentialIssuer};
pub use token::{
    issue_token, strip_bearer, ClaimsValidator, SigningContext, TokenIssuer, TokenServiceConfig,
};
