//! Common test utilities and helpers for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use moneyflow_auth::auth::{AuthConfig, AuthService, TokenIssuer};
use moneyflow_auth::config::ServerConfig;
use moneyflow_auth::database::SqliteDatabase;
use moneyflow_auth::server::{build_router, AppState};

/// Signing secret shared by every test service
pub const TEST_SECRET: &str = "integration-test-secret";

/// A password accepted by the strength policy
pub const TEST_PASSWORD: &str = "Passw0rd";

pub type TestService = AuthService<SqliteDatabase, SqliteDatabase>;

/// Create an in-memory database for testing
pub async fn create_test_database() -> Arc<SqliteDatabase> {
    Arc::new(
        SqliteDatabase::new(":memory:")
            .await
            .expect("Failed to create test database"),
    )
}

/// Create a token issuer with the test secret
pub fn create_test_issuer() -> Arc<TokenIssuer> {
    Arc::new(TokenIssuer::new(TEST_SECRET).expect("Failed to create token issuer"))
}

/// Create an auth service backed by the given database
pub fn create_test_service(db: Arc<SqliteDatabase>) -> Arc<TestService> {
    let config = AuthConfig {
        store_timeout: Duration::from_secs(5),
    };
    Arc::new(AuthService::new(
        Arc::clone(&db),
        db,
        create_test_issuer(),
        config,
    ))
}

/// Create a test application state
pub async fn create_test_state() -> (AppState<SqliteDatabase>, Arc<SqliteDatabase>) {
    let database = create_test_database().await;
    let auth_service = create_test_service(Arc::clone(&database));
    (AppState::new(auth_service), database)
}

/// Create an in-process HTTP test server over the full router
pub async fn create_test_app() -> (TestServer, Arc<SqliteDatabase>) {
    let (state, database) = create_test_state().await;
    let app = build_router(state);
    let server = TestServer::new(app).expect("Failed to create test server");
    (server, database)
}

/// Create a test server configuration with a random port
pub fn create_test_server_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0, // Let OS assign a free port
    }
}
