//! Authentication flow integration tests
//!
//! Tests the authentication system against a real SQLite store including:
//! - Registration and duplicate handling
//! - Login, refresh token persistence and logout
//! - Bearer authorization
//! - Concurrent logins

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::*;
use moneyflow_auth::auth::{AuthService, AuthConfig, TokenIssuer, ACCESS_TOKEN_TTL};
use moneyflow_auth::database::{CredentialStore, RefreshTokenStore};
use moneyflow_auth::error::AuthError;

/// Test 1: Register, login, logout lifecycle
#[tokio::test]
async fn test_register_login_logout_lifecycle() {
    let database = create_test_database().await;
    let service = create_test_service(Arc::clone(&database));

    service.register("a@x.com", TEST_PASSWORD).await.unwrap();

    let identity = database
        .find_identity_by_email("a@x.com")
        .await
        .unwrap()
        .expect("identity should exist");
    assert!(identity.password_hash.starts_with("$argon2id$"));
    assert_ne!(identity.password_hash, TEST_PASSWORD);

    let tokens = service.login("a@x.com", TEST_PASSWORD).await.unwrap();

    let record = database
        .find_refresh_token(&tokens.refresh_token)
        .await
        .unwrap()
        .expect("refresh token record should exist");
    assert_eq!(record.user_id, identity.id);
    assert_eq!(
        record.expires_at - record.created_at,
        chrono::Duration::days(7)
    );

    service.logout(&tokens.refresh_token).await.unwrap();

    assert!(database
        .find_refresh_token(&tokens.refresh_token)
        .await
        .unwrap()
        .is_none());
}

/// Test 2: Duplicate registration fails and keeps the first identity
#[tokio::test]
async fn test_duplicate_registration() {
    let database = create_test_database().await;
    let service = create_test_service(Arc::clone(&database));

    service.register("a@x.com", TEST_PASSWORD).await.unwrap();
    let result = service.register("a@x.com", "Other1234").await;

    assert_eq!(result, Err(AuthError::RegistrationFailed));

    // First password still works
    assert!(service.login("a@x.com", TEST_PASSWORD).await.is_ok());
    assert_eq!(
        service.login("a@x.com", "Other1234").await,
        Err(AuthError::InvalidCredentials)
    );
}

/// Test 3: Weak password creates nothing
#[tokio::test]
async fn test_weak_password_not_stored() {
    let database = create_test_database().await;
    let service = create_test_service(Arc::clone(&database));

    assert_eq!(
        service.register("a@x.com", "12345678").await,
        Err(AuthError::WeakPassword)
    );
    assert!(database
        .find_identity_by_email("a@x.com")
        .await
        .unwrap()
        .is_none());
}

/// Test 4: Unknown email and wrong password look the same
#[tokio::test]
async fn test_login_failures_indistinguishable() {
    let database = create_test_database().await;
    let service = create_test_service(database);

    service.register("a@x.com", TEST_PASSWORD).await.unwrap();

    let wrong_password = service.login("a@x.com", "Passw0rdx").await;
    let unknown_email = service.login("nobody@x.com", TEST_PASSWORD).await;
    let wrong_case = service.login("A@x.com", TEST_PASSWORD).await;

    assert_eq!(wrong_password, Err(AuthError::InvalidCredentials));
    assert_eq!(unknown_email, wrong_password);
    assert_eq!(wrong_case, wrong_password);
}

/// Test 5: Access token from login authorizes
#[tokio::test]
async fn test_authorize_with_access_token() {
    let database = create_test_database().await;
    let service = create_test_service(Arc::clone(&database));

    service.register("a@x.com", TEST_PASSWORD).await.unwrap();
    let identity = database
        .find_identity_by_email("a@x.com")
        .await
        .unwrap()
        .unwrap();
    let tokens = service.login("a@x.com", TEST_PASSWORD).await.unwrap();

    assert_eq!(
        service.authorize(&format!("Bearer {}", tokens.access_token)),
        Ok(identity.id)
    );
    assert_eq!(service.authorize("Token abc"), Err(AuthError::Unauthenticated));
    assert_eq!(service.authorize(""), Err(AuthError::Unauthenticated));
}

/// Test 6: Token from a service with another secret is rejected
#[tokio::test]
async fn test_authorize_rejects_foreign_token() {
    let service = create_test_service(create_test_database().await);
    let foreign = TokenIssuer::new("some-other-secret").unwrap();
    let token = foreign.issue(1, "a@x.com", ACCESS_TOKEN_TTL).unwrap();

    assert_eq!(
        service.authorize(&format!("Bearer {}", token)),
        Err(AuthError::Unauthenticated)
    );
}

/// Test 7: Concurrent logins each get their own refresh token
#[tokio::test]
async fn test_concurrent_logins_distinct_tokens() {
    let database = create_test_database().await;
    let service = create_test_service(Arc::clone(&database));

    service.register("a@x.com", TEST_PASSWORD).await.unwrap();

    let (first, second, third) = tokio::join!(
        service.login("a@x.com", TEST_PASSWORD),
        service.login("a@x.com", TEST_PASSWORD),
        service.login("a@x.com", TEST_PASSWORD),
    );
    let pairs = [first.unwrap(), second.unwrap(), third.unwrap()];

    let refresh_tokens: HashSet<&str> =
        pairs.iter().map(|p| p.refresh_token.as_str()).collect();
    assert_eq!(refresh_tokens.len(), 3);

    for token in &refresh_tokens {
        assert!(database.find_refresh_token(token).await.unwrap().is_some());
    }

    // Revoking one session leaves the others
    service.logout(&pairs[0].refresh_token).await.unwrap();
    assert!(database
        .find_refresh_token(&pairs[0].refresh_token)
        .await
        .unwrap()
        .is_none());
    assert!(database
        .find_refresh_token(&pairs[1].refresh_token)
        .await
        .unwrap()
        .is_some());
}

/// Test 8: Logout is idempotent
#[tokio::test]
async fn test_logout_idempotent() {
    let database = create_test_database().await;
    let service = create_test_service(database);

    service.register("a@x.com", TEST_PASSWORD).await.unwrap();
    let tokens = service.login("a@x.com", TEST_PASSWORD).await.unwrap();

    assert_eq!(service.logout(&tokens.refresh_token).await, Ok(()));
    assert_eq!(service.logout(&tokens.refresh_token).await, Ok(()));
    assert_eq!(service.logout("never-issued").await, Ok(()));
}

/// Test 9: Racing registrations for one email produce exactly one identity
#[tokio::test]
async fn test_racing_registrations() {
    let database = create_test_database().await;
    let service = create_test_service(Arc::clone(&database));

    let (first, second) = tokio::join!(
        service.register("race@x.com", TEST_PASSWORD),
        service.register("race@x.com", TEST_PASSWORD),
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes.contains(&Err(AuthError::RegistrationFailed)));
}

/// Test 10: Separate service instances share the store and the secret
#[tokio::test]
async fn test_services_share_state_through_store() {
    let database = create_test_database().await;
    let first = create_test_service(Arc::clone(&database));
    let second = AuthService::new(
        Arc::clone(&database),
        Arc::clone(&database),
        create_test_issuer(),
        AuthConfig::default(),
    );

    first.register("a@x.com", TEST_PASSWORD).await.unwrap();
    let tokens = second.login("a@x.com", TEST_PASSWORD).await.unwrap();

    assert!(first
        .authorize(&format!("Bearer {}", tokens.access_token))
        .is_ok());
    first.logout(&tokens.refresh_token).await.unwrap();
    assert!(database
        .find_refresh_token(&tokens.refresh_token)
        .await
        .unwrap()
        .is_none());
}
