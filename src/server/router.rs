//! HTTP router for moneyflow-auth
//!
//! This module defines the axum router that handles all HTTP requests.
//! It provides routes for:
//! - Health checks
//! - Registration, login and logout
//! - The authenticated identity

use axum::{
    extract::{rejection::JsonRejection, State},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::auth::{AuthService, AuthorizationGuard};
use crate::database::Database;
use crate::models::{CredentialsRequest, IdentityResponse, LogoutRequest, MessageResponse, TokenPair};

use super::middleware::{auth_middleware, logging_middleware, AuthenticatedUser, ErrorResponse};

/// Shared application state
pub struct AppState<D: Database> {
    /// Authentication service
    pub auth_service: Arc<AuthService<D, D>>,

    /// Bearer token guard for protected routes
    pub guard: Arc<AuthorizationGuard>,
}

impl<D: Database> AppState<D> {
    pub fn new(auth_service: Arc<AuthService<D, D>>) -> Self {
        let guard = Arc::new(auth_service.guard().clone());
        Self {
            auth_service,
            guard,
        }
    }
}

impl<D: Database> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            auth_service: Arc::clone(&self.auth_service),
            guard: Arc::clone(&self.guard),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Build the main application router
///
/// # Arguments
///
/// * `state` - Application state containing the auth service
///
/// # Returns
///
/// An axum Router configured with all endpoints
pub fn build_router<D: Database + 'static>(state: AppState<D>) -> Router {
    let protected = Router::new()
        .route("/me", get(me_handler))
        .route_layer(middleware::from_fn_with_state(
            state.guard.clone(),
            auth_middleware,
        ));

    Router::new()
        // Health endpoints
        .route("/health-check", get(health_handler))
        .route("/ping", get(ping_handler))
        // Session endpoints
        .route("/register", post(register_handler::<D>))
        .route("/login", post(login_handler::<D>))
        .route("/logout", post(logout_handler::<D>))
        .with_state(state)
        .merge(protected)
        .layer(middleware::from_fn(logging_middleware))
}

// =============================================================================
// Health Handlers
// =============================================================================

/// Health check endpoint handler
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn ping_handler() -> impl IntoResponse {
    Json(MessageResponse::new("pong"))
}

// =============================================================================
// Session Handlers
// =============================================================================

/// Unwrap a JSON body, reporting any rejection as a bad request
fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ErrorResponse> {
    payload.map(|Json(body)| body).map_err(|e| {
        debug!(error = %e, "Rejected request body");
        ErrorResponse::invalid_request()
    })
}

/// Registration handler
async fn register_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ErrorResponse> {
    let req = parse_body(payload)?;
    if !req.is_well_formed() {
        return Err(ErrorResponse::invalid_request());
    }

    state
        .auth_service
        .register(&req.email, &req.password)
        .await
        .map_err(ErrorResponse::from_error)?;

    Ok(Json(MessageResponse::ok()))
}

/// Login handler
async fn login_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, ErrorResponse> {
    let req = parse_body(payload)?;
    if !req.is_well_formed() {
        return Err(ErrorResponse::invalid_request());
    }

    let tokens = state
        .auth_service
        .login(&req.email, &req.password)
        .await
        .map_err(ErrorResponse::from_error)?;

    Ok(Json(tokens))
}

/// Logout handler
async fn logout_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    payload: Result<Json<LogoutRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ErrorResponse> {
    let req = parse_body(payload)?;
    if !req.is_well_formed() {
        return Err(ErrorResponse::invalid_request());
    }

    state
        .auth_service
        .logout(&req.refresh_token)
        .await
        .map_err(ErrorResponse::from_error)?;

    Ok(Json(MessageResponse::ok()))
}

/// Current identity handler, behind the auth middleware
async fn me_handler(
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> Json<IdentityResponse> {
    Json(IdentityResponse { user_id })
}
