//! Authentication service
//!
//! This module provides the main authentication interface for the application.
//! It handles registration, login, logout and bearer authorization on top of
//! the credential and refresh token stores.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::database::{CredentialStore, RefreshTokenStore};
use crate::error::{AuthError, DbError};
use crate::models::TokenPair;

use super::guard::AuthorizationGuard;
use super::password::{hash_password, verify_password};
use super::policy::is_strong_password;
use super::token::{TokenIssuer, ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL};

/// Default upper bound for a single store call
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Upper bound for every store call
    pub store_timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

/// Authentication service
///
/// Holds no mutable state of its own; share it behind an `Arc`.
pub struct AuthService<C: CredentialStore, R: RefreshTokenStore> {
    credentials: Arc<C>,
    refresh_tokens: Arc<R>,
    issuer: Arc<TokenIssuer>,
    guard: AuthorizationGuard,
    config: AuthConfig,
}

impl<C: CredentialStore, R: RefreshTokenStore> AuthService<C, R> {
    /// Create a new authentication service
    pub fn new(
        credentials: Arc<C>,
        refresh_tokens: Arc<R>,
        issuer: Arc<TokenIssuer>,
        config: AuthConfig,
    ) -> Self {
        let guard = AuthorizationGuard::new(issuer.clone());
        Self {
            credentials,
            refresh_tokens,
            issuer,
            guard,
            config,
        }
    }

    /// The guard used by [`AuthService::authorize`]
    pub fn guard(&self) -> &AuthorizationGuard {
        &self.guard
    }

    /// Register a new identity
    ///
    /// The store is not touched when the password is too weak.
    pub async fn register(&self, email: &str, password: &str) -> Result<(), AuthError> {
        if !is_strong_password(password) {
            debug!("Registration rejected: weak password");
            return Err(AuthError::WeakPassword);
        }

        let password_hash = hash_password(password).map_err(|e| {
            warn!(error = %e, "Password hashing failed");
            AuthError::HashingFailure
        })?;

        let result = self
            .bounded(
                "create_identity",
                self.credentials.create_identity(email, &password_hash),
            )
            .await?;

        match result {
            Ok(user_id) => {
                info!(user_id = user_id, "Identity registered");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to create identity");
                Err(AuthError::RegistrationFailed)
            }
        }
    }

    /// Check credentials and issue an access and refresh token
    ///
    /// Unknown email and wrong password produce the same error. The refresh
    /// token is only returned once its record has been stored.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let lookup = self
            .bounded(
                "find_identity_by_email",
                self.credentials.find_identity_by_email(email),
            )
            .await?;

        let identity = match lookup {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                debug!("Login rejected: unknown email");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                warn!(error = %e, "Identity lookup failed");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !verify_password(&identity.password_hash, password) {
            debug!(user_id = identity.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        let issue = |ttl: Duration| {
            self.issuer
                .issue_at(identity.id, &identity.email, now, ttl)
                .map_err(|e| {
                    warn!(user_id = identity.id, error = %e, "Token signing failed");
                    AuthError::TokenIssueFailure
                })
        };
        let access_token = issue(ACCESS_TOKEN_TTL)?;
        let refresh_token = issue(REFRESH_TOKEN_TTL)?;

        let expires_at = chrono::Duration::from_std(REFRESH_TOKEN_TTL)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(AuthError::TokenIssueFailure)?;
        let saved = self
            .bounded(
                "save_refresh_token",
                self.refresh_tokens
                    .save_refresh_token(identity.id, &refresh_token, expires_at, now),
            )
            .await?;

        if let Err(e) = saved {
            warn!(user_id = identity.id, error = %e, "Failed to persist refresh token");
            return Err(AuthError::SessionPersistFailure);
        }

        info!(user_id = identity.id, "User logged in");

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Revoke a refresh token
    ///
    /// Revoking a token that was never issued, or was already revoked, succeeds.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let result = self
            .bounded(
                "delete_refresh_token",
                self.refresh_tokens.delete_refresh_token(refresh_token),
            )
            .await?;

        match result {
            Ok(()) => {
                info!("Refresh token revoked");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to revoke refresh token");
                Err(AuthError::SessionRevokeFailure)
            }
        }
    }

    /// Resolve an `Authorization` header to a user id
    pub fn authorize(&self, header: &str) -> Result<i64, AuthError> {
        self.guard.authorize(header)
    }

    /// Run a store call under the configured timeout
    ///
    /// A timeout only stops waiting. A store that already handed the write to
    /// its connection may still commit it after `Timeout` is returned.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, DbError>>,
    ) -> Result<Result<T, DbError>, AuthError> {
        tokio::time::timeout(self.config.store_timeout, call)
            .await
            .map_err(|_| {
                warn!(
                    operation = operation,
                    timeout_ms = self.config.store_timeout.as_millis() as u64,
                    "Store call timed out"
                );
                AuthError::Timeout
            })
    }
}
