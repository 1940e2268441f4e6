//! Application error types for moneyflow-auth
//!
//! This module defines the error types used throughout the application.
//! All error types use `thiserror` for ergonomic error handling.

use rusqlite::ErrorCode;
use thiserror::Error;

/// Authentication-related errors
///
/// These are the only errors that cross the boundary of the credential and
/// session-token core. Store and crypto failures are logged where they occur
/// and collapsed into one of these kinds.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Password rejected by the strength policy
    #[error("Password is too weak")]
    WeakPassword,

    /// Password hashing failed
    #[error("Failed to hash password")]
    HashingFailure,

    /// The credential store refused the new identity
    #[error("Registration failed")]
    RegistrationFailed,

    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The refresh token record could not be stored
    #[error("Failed to persist session")]
    SessionPersistFailure,

    /// Token signing failed
    #[error("Failed to issue token")]
    TokenIssueFailure,

    /// The refresh token record could not be deleted
    #[error("Failed to revoke session")]
    SessionRevokeFailure,

    /// Missing, malformed, expired or forged bearer token
    #[error("Unauthenticated")]
    Unauthenticated,

    /// A store operation did not finish within the configured timeout
    #[error("Operation timed out")]
    Timeout,
}

/// Token signing and verification errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Signature, structure, algorithm, expiry or claims did not validate
    #[error("Invalid token")]
    InvalidToken,

    /// Signing failed
    #[error("Failed to sign token: {0}")]
    Signing(String),

    /// No signing secret configured
    #[error("Token signing secret must not be empty")]
    EmptySecret,
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DbError {
    /// SQLite error
    #[error("Database error: {0}")]
    Sqlite(#[source] rusqlite::Error),

    /// Connection to the database thread was lost
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Record not found
    #[error("Record not found")]
    NotFound,

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref failure, ref message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                DbError::ConstraintViolation(
                    message.clone().unwrap_or_else(|| failure.to_string()),
                )
            }
            rusqlite::Error::QueryReturnedNoRows => DbError::NotFound,
            other => DbError::Sqlite(other),
        }
    }
}

impl From<tokio_rusqlite::Error> for DbError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        match err {
            tokio_rusqlite::Error::Rusqlite(e) => e.into(),
            other => DbError::Connection(other.to_string()),
        }
    }
}
