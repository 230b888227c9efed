//! Integration tests for the PostgreSQL credential store.
//!
//! Skipped unless `DATABASE_URL` points at a reachable database.

use chef_market::auth::{
    ChefProfile, CredentialStore, NewUser, PasswordHasher, ProfileUpdate, StoreError,
};
use chef_market::db::{Database, DatabaseConfig, PgCredentialStore};
use uuid::Uuid;

/// Helper to create a store against the test database, if configured
async fn setup_store() -> Option<PgCredentialStore> {
    let database_url = std::env::var("DATABASE_URL").ok()?;

    let config = DatabaseConfig {
        database_url,
        max_connections: 5,
        min_connections: 1,
        connection_timeout_secs: 5,
        idle_timeout_secs: 300,
        max_lifetime_secs: 1800,
    };

    let db = Database::new(&config)
        .await
        .expect("Failed to create test database");
    db.ensure_schema().await.expect("Failed to create schema");
    db.health_check().await.expect("Database not healthy");

    Some(PgCredentialStore::new(
        db.pool().clone(),
        PasswordHasher::new("test_pepper_for_testing_only".to_string()),
    ))
}

/// Generate unique email for tests
fn unique_email(prefix: &str) -> String {
    format!("{}_{}@test.com", prefix, Uuid::new_v4().simple())
}

#[tokio::test]
async fn test_pg_create_find_verify() {
    let Some(store) = setup_store().await else {
        return;
    };
    let email = unique_email("create");

    let user = store
        .create(NewUser {
            email: email.clone(),
            password: "secret1".to_string(),
            is_chef: false,
        })
        .await
        .unwrap();

    let found = store.find_by_email(&email).await.unwrap().unwrap();
    assert_eq!(found.id, user.id);
    assert!(store.verify_password(&found, "secret1").await.unwrap());
    assert!(!store.verify_password(&found, "wrong").await.unwrap());
}

#[tokio::test]
async fn test_pg_duplicate_email() {
    let Some(store) = setup_store().await else {
        return;
    };
    let email = unique_email("dup");
    let new_user = NewUser {
        email,
        password: "secret1".to_string(),
        is_chef: false,
    };

    store.create(new_user.clone()).await.unwrap();
    let result = store.create(new_user).await;
    assert!(matches!(result, Err(StoreError::DuplicateEmail)));
}

#[tokio::test]
async fn test_pg_update_and_chef_profile() {
    let Some(store) = setup_store().await else {
        return;
    };
    let user = store
        .create(NewUser {
            email: unique_email("update"),
            password: "secret1".to_string(),
            is_chef: false,
        })
        .await
        .unwrap();

    let update = ProfileUpdate {
        first_name: Some("Ada".to_string()),
        allergies: Some(vec!["peanuts".to_string()]),
        ..ProfileUpdate::default()
    };
    let updated = store.update_profile(user.id, update).await.unwrap().unwrap();
    assert_eq!(updated.profile.first_name.as_deref(), Some("Ada"));

    let chef = ChefProfile {
        cuisine_specialty: vec!["Thai".to_string()],
        bio: None,
    };
    let chef_user = store
        .set_chef_profile(user.id, chef.clone())
        .await
        .unwrap()
        .unwrap();
    assert!(chef_user.is_chef);
    assert_eq!(chef_user.profile.chef_profile, Some(chef));
    assert_eq!(chef_user.profile.first_name.as_deref(), Some("Ada"));
}
