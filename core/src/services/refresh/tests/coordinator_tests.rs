//! Unit tests for the refresh coordinator

use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::{Duration, Utc};

use super::mocks::{FailingTokenRepository, LockstepTokenRepository};
use crate::domain::entities::identity::Identity;
use crate::domain::value_objects::TokenResponse;
use crate::errors::{DomainError, RefreshRejection, TokenError};
use crate::repositories::{InMemoryTokenRepository, InMemoryUserRepository, TokenRepository};
use crate::services::refresh::RefreshCoordinator;
use crate::services::token::{ClaimsValidator, SigningContext, TokenIssuer, TokenServiceConfig};

const KEY: &str = "0123456789abcdef0123456789abcdef";

type Coordinator = RefreshCoordinator<InMemoryTokenRepository, InMemoryUserRepository>;

fn config() -> TokenServiceConfig {
    TokenServiceConfig::new(SigningContext::new(KEY, "api", "client"))
}

fn alice() -> Identity {
    Identity::new(7, "alice").with_roles(["User"]).with_group("Adult")
}

async fn setup(config: TokenServiceConfig) -> (Coordinator, Arc<InMemoryTokenRepository>, Arc<InMemoryUserRepository>) {
    let tokens = Arc::new(InMemoryTokenRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());
    users.upsert(alice()).await;
    let coordinator = RefreshCoordinator::new(tokens.clone(), users.clone(), config).unwrap();
    (coordinator, tokens, users)
}

fn rejection(result: Result<impl std::fmt::Debug, DomainError>) -> RefreshRejection {
    match result {
        Err(DomainError::Token(TokenError::RefreshRejected { reason })) => reason,
        other => panic!("expected refresh rejection, got {:?}", other),
    }
}

#[test]
fn test_new_rejects_short_key() {
    let config = TokenServiceConfig::new(SigningContext::new("short", "api", "client"));
    let result = Coordinator::new(
        Arc::new(InMemoryTokenRepository::new()),
        Arc::new(InMemoryUserRepository::new()),
        config,
    );
    assert!(matches!(result, Err(DomainError::Token(TokenError::SigningKey { .. }))));
}

#[tokio::test]
async fn test_login_stores_refresh_token() {
    let (coordinator, tokens, _) = setup(config()).await;

    let response = coordinator.login(&alice()).await.unwrap();
    assert_eq!(response.refresh_token.len(), 44);

    let now = Utc::now();
    assert!(tokens.is_token_valid(7, &response.refresh_token, now).await.unwrap());

    let record = tokens.find_refresh_token(7).await.unwrap().unwrap();
    assert!(record.expires_at > now + Duration::days(6));

    let claims = ClaimsValidator::extract_claims(&response.access_token, KEY.as_bytes());
    assert_eq!(claims.subject_id(), Some(7));
    assert!(response.expires_at <= now + Duration::minutes(5));
}

#[tokio::test]
async fn test_refresh_rotates_pair() {
    let (coordinator, tokens, _) = setup(config()).await;
    let first = coordinator.login(&alice()).await.unwrap();

    let second = coordinator
        .refresh(&first.access_token, &first.refresh_token)
        .await
        .unwrap();

    assert_ne!(second.refresh_token, first.refresh_token);
    assert_ne!(second.access_token, first.access_token);

    let now = Utc::now();
    assert!(!tokens.is_token_valid(7, &first.refresh_token, now).await.unwrap());
    assert!(tokens.is_token_valid(7, &second.refresh_token, now).await.unwrap());
}

#[tokio::test]
async fn test_refresh_accepts_expired_access_token() {
    let (coordinator, tokens, _) = setup(config()).await;
    let now = Utc::now();
    let refresh_token = TokenIssuer::generate_refresh_token();
    tokens
        .save_refresh_token(7, &refresh_token, now + Duration::days(7))
        .await
        .unwrap();
    let expired = coordinator
        .issuer()
        .issue_at(&alice(), now - Duration::hours(1), now - Duration::minutes(55), &refresh_token)
        .unwrap();

    let response = coordinator
        .refresh(&expired.authorization_value(), &refresh_token)
        .await
        .unwrap();
    assert!(response.expires_at > now);
}

#[tokio::test]
async fn test_refresh_twice_with_same_pair_fails() {
    let (coordinator, _, _) = setup(config()).await;
    let first = coordinator.login(&alice()).await.unwrap();

    coordinator
        .refresh(&first.access_token, &first.refresh_token)
        .await
        .unwrap();
    let replay = coordinator
        .refresh(&first.access_token, &first.refresh_token)
        .await;

    assert_eq!(rejection(replay), RefreshRejection::TokenMismatch);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_refresh_has_one_winner() {
    let (coordinator, _, _) = setup(config()).await;
    let coordinator = Arc::new(coordinator);
    let first = coordinator.login(&alice()).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let coordinator = coordinator.clone();
        let pair = first.clone();
        handles.push(tokio::spawn(async move {
            coordinator.refresh(&pair.access_token, &pair.refresh_token).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(err) => assert!(err.is_unauthenticated()),
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_racing_refresh_loses_at_rotation() {
    let tokens = Arc::new(LockstepTokenRepository::new(InMemoryTokenRepository::new(), 2));
    let users = Arc::new(InMemoryUserRepository::new());
    users.upsert(alice()).await;
    let coordinator = Arc::new(RefreshCoordinator::new(tokens.clone(), users, config()).unwrap());
    let first = coordinator.login(&alice()).await.unwrap();

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let coordinator = coordinator.clone();
            let pair = first.clone();
            tokio::spawn(async move { coordinator.refresh(&pair.access_token, &pair.refresh_token).await })
        })
        .collect();

    let mut winners = Vec::new();
    let mut reasons = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(response) => winners.push(response),
            Err(err) => reasons.push(rejection(Err::<TokenResponse, _>(err))),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(reasons, vec![RefreshRejection::Superseded]);
    let stored = tokens.find_refresh_token(7).await.unwrap().unwrap();
    assert!(stored.matches(&winners[0].refresh_token));
}

#[tokio::test]
async fn test_new_rejects_out_of_range_lifetime() {
    let tokens = Arc::new(InMemoryTokenRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let config = TokenServiceConfig {
        refresh_token_expiry_seconds: 100_000_000_000_000_000,
        ..config()
    };

    let result = RefreshCoordinator::new(tokens.clone(), users, config);
    assert!(matches!(result, Err(DomainError::Validation { .. })));
    assert!(tokens.is_empty().await);
}

#[tokio::test]
async fn test_refresh_rejects_mismatched_token() {
    let (coordinator, _, _) = setup(config()).await;
    let first = coordinator.login(&alice()).await.unwrap();

    let result = coordinator
        .refresh(&first.access_token, &TokenIssuer::generate_refresh_token())
        .await;
    assert_eq!(rejection(result), RefreshRejection::TokenMismatch);
}

#[tokio::test]
async fn test_refresh_rejects_expired_refresh_token() {
    let (coordinator, tokens, _) = setup(config()).await;
    let first = coordinator.login(&alice()).await.unwrap();
    tokens
        .save_refresh_token(7, &first.refresh_token, Utc::now() - Duration::seconds(1))
        .await
        .unwrap();

    let result = coordinator
        .refresh(&first.access_token, &first.refresh_token)
        .await;
    assert_eq!(rejection(result), RefreshRejection::TokenExpired);
}

#[tokio::test]
async fn test_refresh_rejects_foreign_access_token() {
    let (coordinator, _, _) = setup(config()).await;
    let first = coordinator.login(&alice()).await.unwrap();

    let other = TokenIssuer::new(SigningContext::new("fedcba9876543210fedcba9876543210", "api", "client"))
        .unwrap()
        .issue(&alice(), Utc::now() + Duration::minutes(5), "r")
        .unwrap();

    let result = coordinator.refresh(&other.access_token, &first.refresh_token).await;
    assert_eq!(rejection(result), RefreshRejection::NoIdentity);

    let result = coordinator.refresh("garbage", &first.refresh_token).await;
    assert_eq!(rejection(result), RefreshRejection::NoIdentity);
}

#[tokio::test]
async fn test_refresh_without_stored_token() {
    let (coordinator, _, _) = setup(config()).await;
    let pair = coordinator
        .issuer()
        .issue(&alice(), Utc::now() + Duration::minutes(5), "never-stored")
        .unwrap();

    let result = coordinator.refresh(&pair.access_token, "never-stored").await;
    assert_eq!(rejection(result), RefreshRejection::TokenMismatch);
}

#[tokio::test]
async fn test_refresh_rejects_deleted_user() {
    let (coordinator, _, users) = setup(config()).await;
    let first = coordinator.login(&alice()).await.unwrap();
    users.remove(7).await;

    let result = coordinator
        .refresh(&first.access_token, &first.refresh_token)
        .await;
    assert_eq!(rejection(result), RefreshRejection::UnknownSubject);
}

#[tokio::test]
async fn test_refresh_picks_up_role_changes() {
    let (coordinator, _, users) = setup(config()).await;
    let first = coordinator.login(&alice()).await.unwrap();
    users
        .upsert(Identity::new(7, "alice").with_roles(["User", "Admin"]).with_group("Adult"))
        .await;

    let second = coordinator
        .refresh(&first.access_token, &first.refresh_token)
        .await
        .unwrap();

    let claims = ClaimsValidator::extract_claims(&second.access_token, KEY.as_bytes());
    assert_eq!(claims.roles(), vec!["User", "Admin"]);
}

#[tokio::test]
async fn test_absolute_refresh_expiry_is_kept() {
    let (coordinator, tokens, _) = setup(config()).await;
    let first = coordinator.login(&alice()).await.unwrap();
    let login_expiry = tokens.find_refresh_token(7).await.unwrap().unwrap().expires_at;

    coordinator
        .refresh(&first.access_token, &first.refresh_token)
        .await
        .unwrap();

    let record = tokens.find_refresh_token(7).await.unwrap().unwrap();
    assert_eq!(record.expires_at, login_expiry);
}

#[tokio::test]
async fn test_sliding_refresh_expiry_is_renewed() {
    let mut config = config();
    config.sliding_refresh_expiry = true;
    let (coordinator, tokens, _) = setup(config).await;
    let first = coordinator.login(&alice()).await.unwrap();
    tokens
        .save_refresh_token(7, &first.refresh_token, Utc::now() + Duration::hours(1))
        .await
        .unwrap();

    coordinator
        .refresh(&first.access_token, &first.refresh_token)
        .await
        .unwrap();

    let record = tokens.find_refresh_token(7).await.unwrap().unwrap();
    assert!(record.expires_at > Utc::now() + Duration::days(6));
}

#[tokio::test]
async fn test_store_failure_is_not_retried() {
    let tokens = Arc::new(FailingTokenRepository::default());
    let users = Arc::new(InMemoryUserRepository::new());
    users.upsert(alice()).await;
    let coordinator = RefreshCoordinator::new(tokens.clone(), users, config()).unwrap();

    let pair = coordinator
        .issuer()
        .issue(&alice(), Utc::now() + Duration::minutes(5), "r")
        .unwrap();
    let result = coordinator.refresh(&pair.access_token, "r").await;

    assert_eq!(rejection(result), RefreshRejection::StoreUnavailable);
    assert_eq!(tokens.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_login_propagates_store_failure() {
    let tokens = Arc::new(FailingTokenRepository::default());
    let coordinator =
        RefreshCoordinator::new(tokens, Arc::new(InMemoryUserRepository::new()), config()).unwrap();

    let result = coordinator.login(&alice()).await;
    assert!(matches!(result, Err(DomainError::Internal { .. })));
}

#[tokio::test]
async fn test_revoke_and_purge() {
    let (coordinator, tokens, _) = setup(config()).await;
    let first = coordinator.login(&alice()).await.unwrap();

    assert!(coordinator.revoke(7).await.unwrap());
    assert!(!coordinator.revoke(7).await.unwrap());
    let result = coordinator
        .refresh(&first.access_token, &first.refresh_token)
        .await;
    assert_eq!(rejection(result), RefreshRejection::TokenMismatch);

    tokens
        .save_refresh_token(8, "stale", Utc::now() - Duration::days(1))
        .await
        .unwrap();
    assert_eq!(coordinator.purge_expired().await.unwrap(), 1);
}
