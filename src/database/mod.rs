//! Database layer for moneyflow-auth
//!
//! This module defines the credential and refresh token store traits and
//! their SQLite implementation.

pub mod migrations;
pub mod sqlite;

pub use sqlite::SqliteDatabase;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DbError;
use crate::models::{Identity, RefreshTokenRecord};

/// Persistence of registered identities
///
/// Email uniqueness is enforced here: creating a second identity with an
/// existing email fails with [`DbError::ConstraintViolation`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Create an identity and return its assigned id
    async fn create_identity(&self, email: &str, password_hash: &str) -> Result<i64, DbError>;

    /// Look up an identity by exact email
    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, DbError>;
}

/// Persistence of refresh token records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Store a refresh token record
    async fn save_refresh_token(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Result<(), DbError>;

    /// Delete the record with this exact token string
    ///
    /// Deleting a token that has no record succeeds.
    async fn delete_refresh_token(&self, token: &str) -> Result<(), DbError>;

    /// Look up a record by exact token string
    async fn find_refresh_token(&self, token: &str)
        -> Result<Option<RefreshTokenRecord>, DbError>;
}

/// A backend that implements both stores
pub trait Database: CredentialStore + RefreshTokenStore {}

impl<T: CredentialStore + RefreshTokenStore> Database for T {}
