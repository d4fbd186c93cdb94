//! Login issuance and single-use refresh token rotation

mod coordinator;

#[cfg(test)]
mod tests;

pub use coordinator::RefreshCoordinator;
