//! Claim sets extracted from presented tokens.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};

/// Claim type keys
pub mod claim_types {
    /// Canonical subject id claim, written on issuance
    pub const SUBJECT: &str = "sub";
    pub const NAME: &str = "name";
    pub const ROLE: &str = "role";
    pub const GROUP: &str = "group";
    pub const ISSUED_AT: &str = "iat";
    pub const EXPIRES_AT: &str = "exp";
    pub const ISSUER: &str = "iss";
    pub const AUDIENCE: &str = "aud";
    pub const TOKEN_ID: &str = "jti";

    /// Short name-identifier claim
    pub const NAME_IDENTIFIER: &str = "nameid";
    /// Long name-identifier claim type
    pub const NAME_IDENTIFIER_URI: &str =
        "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier";
    /// Custom id claim written by older issuers
    pub const LEGACY_ID: &str = "Id";

    /// Keys accepted as subject id when reading, in priority order
    pub const SUBJECT_ID_KEYS: [&str; 4] = [SUBJECT, NAME_IDENTIFIER, NAME_IDENTIFIER_URI, LEGACY_ID];
}

/// A single named attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// Claims read out of a verified token
///
/// Array-valued claims are flattened to one entry per element, so a token
/// with two roles yields two `role` claims. An empty set means no identity
/// could be established.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimSet {
    claims: Vec<Claim>,
}

impl ClaimSet {
    /// The empty set
    pub fn empty() -> Self {
        Self::default()
    }

    /// Flattens a decoded JWT payload
    pub fn from_payload(payload: Map<String, Value>) -> Self {
        let mut claims = Vec::with_capacity(payload.len());
        for (claim_type, value) in payload {
            match value {
                Value::Array(items) => {
                    for item in items {
                        if let Some(v) = claim_value(item) {
                            claims.push(Claim::new(claim_type.clone(), v));
                        }
                    }
                }
                other => {
                    if let Some(v) = claim_value(other) {
                        claims.push(Claim::new(claim_type, v));
                    }
                }
            }
        }
        Self { claims }
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Claim> {
        self.claims.iter()
    }

    /// First value of a claim type
    pub fn first(&self, claim_type: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }

    /// All values of a claim type, in token order
    pub fn values<'a>(&'a self, claim_type: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.claims
            .iter()
            .filter(move |c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }

    /// Subject id, read from the first present key of
    /// [`claim_types::SUBJECT_ID_KEYS`]
    ///
    /// `None` when no key is present or the value is not an integer.
    pub fn subject_id(&self) -> Option<i64> {
        claim_types::SUBJECT_ID_KEYS
            .iter()
            .find_map(|key| self.first(key))
            .and_then(|v| v.trim().parse().ok())
    }

    pub fn user_name(&self) -> Option<&str> {
        self.first(claim_types::NAME)
    }

    pub fn roles(&self) -> Vec<&str> {
        self.values(claim_types::ROLE).collect()
    }

    pub fn group(&self) -> Option<&str> {
        self.first(claim_types::GROUP)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.first(claim_types::EXPIRES_AT)
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
    }
}

impl<'a> IntoIterator for &'a ClaimSet {
    type Item = &'a Claim;
    type IntoIter = std::slice::Iter<'a, Claim>;

    fn into_iter(self) -> Self::IntoIter {
        self.claims.iter()
    }
}

impl FromIterator<Claim> for ClaimSet {
    fn from_iter<T: IntoIterator<Item = Claim>>(iter: T) -> Self {
        Self {
            claims: iter.into_iter().collect(),
        }
    }
}

fn claim_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
