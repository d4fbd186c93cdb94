//! Value objects representing immutable domain concepts.

pub mod session_cookie;
pub mod token_response;

// Re-export commonly used types
pub use session_cookie::{SameSite, SessionCookie};
pub use token_response::TokenResponse;
