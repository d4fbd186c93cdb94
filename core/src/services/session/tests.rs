//! Unit tests for cookie sessions and the credential strategies

use chrono::{Duration, Utc};
use ra_shared::config::SessionConfig;

use crate::domain::entities::identity::Identity;
use crate::errors::DomainError;
use crate::services::session::{CookieSessionIssuer, CredentialIssuer};
use crate::services::token::{SigningContext, TokenIssuer};

const KEY: &str = "0123456789abcdef0123456789abcdef";

fn signing() -> SigningContext {
    SigningContext::new(KEY, "api", "client")
}

fn alice() -> Identity {
    Identity::new(7, "alice").with_roles(["User"]).with_group("Adult")
}

fn issuer() -> CookieSessionIssuer {
    CookieSessionIssuer::new(signing(), &SessionConfig::default()).unwrap()
}

#[test]
fn test_sign_in_round_trips_claims() {
    let issuer = issuer();
    let cookie = issuer.sign_in(&alice(), None, false).unwrap();

    assert_eq!(cookie.name, "reelauth_session");
    assert!(cookie.http_only);

    let claims = issuer.read_session(&cookie.value);
    assert_eq!(claims.subject_id(), Some(7));
    assert_eq!(claims.user_name(), Some("alice"));
    assert_eq!(claims.roles(), vec!["User"]);
    assert_eq!(claims.group(), Some("Adult"));
}

#[test]
fn test_non_persistent_cookie_has_no_expires() {
    let cookie = issuer().sign_in(&alice(), None, false).unwrap();
    assert!(cookie.expires.is_none());
    assert!(!cookie.to_header_value().contains("Expires"));
}

#[test]
fn test_persistent_cookie_carries_expiration() {
    let expiration = Utc::now() + Duration::hours(2);
    let cookie = issuer().sign_in(&alice(), Some(expiration), true).unwrap();

    assert_eq!(cookie.expires.map(|e| e.timestamp()), Some(expiration.timestamp()));
    assert!(cookie.to_header_value().contains("Expires="));
}

#[test]
fn test_sign_in_rejects_past_expiration() {
    let result = issuer().sign_in(&alice(), Some(Utc::now() - Duration::minutes(1)), true);
    assert!(matches!(result, Err(DomainError::Token(_))));
}

#[test]
fn test_sign_out_cookie_is_expired() {
    let issuer = issuer();
    let cookie = issuer.sign_out();

    assert_eq!(cookie.name, issuer.cookie_name());
    assert!(cookie.value.is_empty());
    assert!(cookie.is_expired_at(Utc::now()));
    assert!(cookie.to_header_value().contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
}

#[test]
fn test_read_session_rejects_foreign_ticket() {
    let other = CookieSessionIssuer::new(
        SigningContext::new("ffffffffffffffffffffffffffffffff", "api", "client"),
        &SessionConfig::default(),
    )
    .unwrap();
    let cookie = other.sign_in(&alice(), None, false).unwrap();

    assert!(issuer().read_session(&cookie.value).is_empty());
    assert!(issuer().read_session("").is_empty());
    assert!(issuer().read_session("not-a-ticket").is_empty());
}

#[test]
fn test_invalid_same_site_is_rejected() {
    let config = SessionConfig {
        same_site: "Sideways".to_string(),
        ..SessionConfig::default()
    };
    let result = CookieSessionIssuer::new(signing(), &config);
    assert!(matches!(result, Err(DomainError::Validation { .. })));
}

#[test]
fn test_short_key_is_rejected() {
    let result = CookieSessionIssuer::new(SigningContext::new("short", "api", "client"), &SessionConfig::default());
    assert!(matches!(result, Err(DomainError::Token(_))));
}

fn issue_with<C: CredentialIssuer>(issuer: &C, identity: &Identity) -> C::Credential {
    issuer
        .issue_credential(identity, Utc::now() + Duration::minutes(5))
        .unwrap()
}

#[test]
fn test_both_strategies_issue_credentials() {
    let token = issue_with(&TokenIssuer::new(signing()).unwrap(), &alice());
    assert_eq!(token.refresh_token.len(), 44);
    assert_eq!(token.token_type, "Bearer");

    let cookie = issue_with(&issuer(), &alice());
    assert!(cookie.expires.is_some());
    assert_eq!(issuer().read_session(&cookie.value).subject_id(), Some(7));
}

#[test]
fn test_new_rejects_out_of_range_lifetime() {
    for lifetime in [0, i64::MAX] {
        let session = SessionConfig {
            lifetime,
            ..SessionConfig::default()
        };
        let result = CookieSessionIssuer::new(signing(), &session);
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }
}
