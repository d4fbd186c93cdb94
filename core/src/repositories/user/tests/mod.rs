//! Unit tests for the in-memory user repository

use crate::domain::entities::identity::Identity;
use crate::repositories::user::{InMemoryUserRepository, UserRepository};

#[tokio::test]
async fn test_upsert_and_find_identity() {
    let repo = InMemoryUserRepository::new();
    repo.upsert(Identity::new(7, "alice").with_roles(["User"])).await;

    let found = repo.find_identity(7).await.unwrap().unwrap();
    assert_eq!(found.user_name, "alice");
    assert_eq!(found.role_names, vec!["User".to_string()]);

    assert!(repo.find_identity(8).await.unwrap().is_none());
}

#[tokio::test]
async fn test_upsert_replaces_roles() {
    let repo = InMemoryUserRepository::new();
    repo.upsert(Identity::new(7, "alice").with_roles(["User"])).await;
    repo.upsert(Identity::new(7, "alice").with_roles(["User", "Admin"]).with_group("Adult"))
        .await;

    let found = repo.find_identity(7).await.unwrap().unwrap();
    assert_eq!(found.role_names.len(), 2);
    assert_eq!(found.group_label, "Adult");
}

#[tokio::test]
async fn test_remove_identity() {
    let repo = InMemoryUserRepository::new();
    repo.upsert(Identity::new(7, "alice")).await;

    assert!(repo.remove(7).await.is_some());
    assert!(repo.find_identity(7).await.unwrap().is_none());
}
