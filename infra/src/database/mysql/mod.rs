//! MySQL-specific database implementations
//!
//! Refresh tokens live on the `users` row; roles and group are joined from
//! `user_roles`, `roles` and `groups`.

pub mod token_repository_impl;
pub mod user_repository_impl;

// Re-export the MySQL implementations
pub use token_repository_impl::MySqlTokenRepository;
pub use user_repository_impl::MySqlUserRepository;
