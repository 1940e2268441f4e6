//! HTTP middleware for moneyflow-auth
//!
//! This module provides middleware layers for:
//! - Bearer token authentication
//! - Request/response logging
//!
//! It also defines the JSON error body shared by all handlers.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use std::time::Instant;

use crate::auth::AuthorizationGuard;
use crate::error::AuthError;

/// Message used for every malformed request body
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid request data";

/// Authenticated user extension for requests
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser(pub i64);

/// Authentication middleware function
///
/// Requires an `Authorization: Bearer <token>` header carrying a valid access
/// token and adds the [`AuthenticatedUser`] to the request extensions.
pub async fn auth_middleware(
    State(guard): State<Arc<AuthorizationGuard>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ErrorResponse> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ErrorResponse::from_error(AuthError::Unauthenticated))?;

    let user_id = guard
        .authorize(auth_header)
        .map_err(ErrorResponse::from_error)?;

    request.extensions_mut().insert(AuthenticatedUser(user_id));

    Ok(next.run(request).await)
}

/// JSON error response: `{"statusCode": n, "message": "..."}`
#[derive(Debug)]
pub struct ErrorResponse {
    status: StatusCode,
    message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Map an [`AuthError`] to its HTTP status, keeping its message
    pub fn from_error(error: AuthError) -> Self {
        let status = match error {
            AuthError::WeakPassword | AuthError::RegistrationFailed => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials | AuthError::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::HashingFailure
            | AuthError::SessionPersistFailure
            | AuthError::TokenIssueFailure
            | AuthError::SessionRevokeFailure => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self::new(status, error.to_string())
    }

    /// Malformed body, missing fields or an invalid email
    pub fn invalid_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST, INVALID_REQUEST_MESSAGE)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "statusCode": self.status.as_u16(),
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

/// Logging middleware function
///
/// Logs request and response details including:
/// - Method and path
/// - Status code
/// - Response time
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        path = %uri.path(),
        status = %status.as_u16(),
        duration_ms = %elapsed.as_millis(),
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{TokenIssuer, ACCESS_TOKEN_TTL};
    use axum::{
        http::{HeaderName, HeaderValue},
        middleware,
        routing::get,
        Extension, Router,
    };
    use axum_test::TestServer;

    fn create_test_guard() -> (Arc<AuthorizationGuard>, Arc<TokenIssuer>) {
        let issuer = Arc::new(TokenIssuer::new("middleware-secret").unwrap());
        let guard = Arc::new(AuthorizationGuard::new(issuer.clone()));
        (guard, issuer)
    }

    async fn whoami(Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>) -> String {
        user_id.to_string()
    }

    fn create_test_server(guard: Arc<AuthorizationGuard>) -> TestServer {
        let app = Router::new()
            .route("/protected", get(whoami))
            .route_layer(middleware::from_fn_with_state(guard, auth_middleware));
        TestServer::new(app).unwrap()
    }

    fn bearer(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
    }

    // Test 1: Auth middleware rejects request without auth header
    #[tokio::test]
    async fn test_auth_middleware_rejects_no_auth() {
        let (guard, _) = create_test_guard();
        let server = create_test_server(guard);

        let response = server.get("/protected").await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["statusCode"], 401);
        assert_eq!(body["message"], "Unauthenticated");
    }

    // Test 2: Auth middleware accepts valid bearer token
    #[tokio::test]
    async fn test_auth_middleware_accepts_valid_token() {
        let (guard, issuer) = create_test_guard();
        let token = issuer.issue(42, "a@x.com", ACCESS_TOKEN_TTL).unwrap();
        let server = create_test_server(guard);

        let response = server
            .get("/protected")
            .add_header(HeaderName::from_static("authorization"), bearer(&token))
            .await;

        response.assert_status_ok();
        response.assert_text("42");
    }

    // Test 3: Auth middleware rejects token from another issuer
    #[tokio::test]
    async fn test_auth_middleware_rejects_invalid_token() {
        let (guard, _) = create_test_guard();
        let other = TokenIssuer::new("other-secret").unwrap();
        let token = other.issue(42, "a@x.com", ACCESS_TOKEN_TTL).unwrap();
        let server = create_test_server(guard);

        let response = server
            .get("/protected")
            .add_header(HeaderName::from_static("authorization"), bearer(&token))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    // Test 4: Auth middleware rejects other schemes
    #[tokio::test]
    async fn test_auth_middleware_rejects_other_scheme() {
        let (guard, issuer) = create_test_guard();
        let token = issuer.issue(42, "a@x.com", ACCESS_TOKEN_TTL).unwrap();
        let server = create_test_server(guard);

        let response = server
            .get("/protected")
            .add_header(
                HeaderName::from_static("authorization"),
                HeaderValue::from_str(&format!("Token {}", token)).unwrap(),
            )
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    // Test 5: ErrorResponse from_error creates correct responses
    #[test]
    fn test_error_response_from_error() {
        let cases = [
            (AuthError::WeakPassword, StatusCode::BAD_REQUEST),
            (AuthError::RegistrationFailed, StatusCode::BAD_REQUEST),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (AuthError::HashingFailure, StatusCode::INTERNAL_SERVER_ERROR),
            (AuthError::SessionPersistFailure, StatusCode::INTERNAL_SERVER_ERROR),
            (AuthError::TokenIssueFailure, StatusCode::INTERNAL_SERVER_ERROR),
            (AuthError::SessionRevokeFailure, StatusCode::INTERNAL_SERVER_ERROR),
            (AuthError::Timeout, StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (error, status) in cases {
            let resp = ErrorResponse::from_error(error);
            assert_eq!(resp.status(), status, "{:?}", error);
            assert_eq!(resp.message(), error.to_string());
        }
    }

    // Test 6: invalid_request message
    #[test]
    fn test_error_response_invalid_request() {
        let resp = ErrorResponse::invalid_request();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.message(), "Invalid request data");
    }

    // Test 7: Logging middleware passes the response through
    #[tokio::test]
    async fn test_logging_middleware_passthrough() {
        let app = Router::new()
            .route("/ok", get(|| async { "OK" }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app).unwrap();

        let response = server.get("/ok").await;

        response.assert_status_ok();
        response.assert_text("OK");
    }
}
