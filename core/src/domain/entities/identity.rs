//! Authenticated identity handed to the token core by its callers.

use serde::{Deserialize, Serialize};

/// An already-authenticated user
///
/// Supplied by the caller for every issuance; the core never owns or
/// persists it. Role order is preserved into the issued claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Numeric user id, emitted as the subject claim
    pub user_id: i64,

    /// Login name
    pub user_name: String,

    /// Role names in the order they should appear in the token
    pub role_names: Vec<String>,

    /// Free-form group label (empty when the user has no group)
    pub group_label: String,
}

impl Identity {
    /// Creates an identity without roles or group
    pub fn new(user_id: i64, user_name: impl Into<String>) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            role_names: Vec::new(),
            group_label: String::new(),
        }
    }

    /// Adds roles, keeping their order
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role_names.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Sets the group label
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group_label = group.into();
        self
    }

    /// The subject claim value for this identity
    pub fn subject(&self) -> String {
        self.user_id.to_string()
    }
}
