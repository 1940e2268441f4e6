//! SQLite implementation of the store traits
//!
//! This module provides a SQLite-based implementation of [`CredentialStore`]
//! and [`RefreshTokenStore`] using rusqlite and tokio-rusqlite for async
//! operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;
use tracing::warn;

use super::migrations::CREATE_SCHEMA;
use super::{CredentialStore, RefreshTokenStore};
use crate::error::DbError;
use crate::models::{Identity, RefreshTokenRecord};

/// SQLite database implementation
pub struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    /// Create a new SQLite database connection
    ///
    /// Use `:memory:` for in-memory database or a file path for persistent storage.
    pub async fn new(path: &str) -> Result<Self, DbError> {
        let conn = Connection::open(path).await?;

        // Run migrations
        conn.call(|conn| {
            conn.execute_batch(CREATE_SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    /// Create a new in-memory database (useful for testing)
    pub async fn in_memory() -> Result<Self, DbError> {
        Self::new(":memory:").await
    }
}

#[async_trait]
impl CredentialStore for SqliteDatabase {
    async fn create_identity(&self, email: &str, password_hash: &str) -> Result<i64, DbError> {
        let email = email.to_string();
        let password_hash = password_hash.to_string();
        let created_at = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO users (email, password_hash, created_at)
                    VALUES (?1, ?2, ?3)
                    "#,
                    rusqlite::params![email, password_hash, created_at],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(Into::into)
    }

    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, DbError> {
        let email = email.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, email, password_hash, created_at
                    FROM users
                    WHERE email = ?1
                    "#,
                )?;

                let result = stmt
                    .query_row([&email], |row| {
                        Ok(Identity {
                            id: row.get(0)?,
                            email: row.get(1)?,
                            password_hash: row.get(2)?,
                            created_at: stored_datetime(
                                "users.created_at",
                                row.get::<_, Option<String>>(3)?,
                            ),
                        })
                    })
                    .optional()?;

                Ok(result)
            })
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl RefreshTokenStore for SqliteDatabase {
    async fn save_refresh_token(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let token = token.to_string();
        let expires_at = expires_at.to_rfc3339();
        let created_at = created_at.to_rfc3339();

        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO refresh_tokens (user_id, token, expires_at, created_at)
                    VALUES (?1, ?2, ?3, ?4)
                    "#,
                    rusqlite::params![user_id, token, expires_at, created_at],
                )?;
                Ok(())
            })
            .await?;

        Ok(())
    }

    async fn delete_refresh_token(&self, token: &str) -> Result<(), DbError> {
        let token = token.to_string();

        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM refresh_tokens WHERE token = ?1", [&token])?;
                Ok(())
            })
            .await?;

        Ok(())
    }

    async fn find_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, DbError> {
        let token = token.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, user_id, token, expires_at, created_at
                    FROM refresh_tokens
                    WHERE token = ?1
                    "#,
                )?;

                let result = stmt
                    .query_row([&token], |row| {
                        Ok(RefreshTokenRecord {
                            id: row.get(0)?,
                            user_id: row.get(1)?,
                            token: row.get(2)?,
                            expires_at: stored_datetime(
                                "refresh_tokens.expires_at",
                                row.get::<_, Option<String>>(3)?,
                            ),
                            created_at: stored_datetime(
                                "refresh_tokens.created_at",
                                row.get::<_, Option<String>>(4)?,
                            ),
                        })
                    })
                    .optional()?;

                Ok(result)
            })
            .await
            .map_err(Into::into)
    }
}

/// Read a stored timestamp, falling back to the current time
///
/// The fallback is logged so corrupt rows stay visible.
fn stored_datetime(column: &'static str, value: Option<String>) -> DateTime<Utc> {
    match parse_datetime(value.clone()) {
        Some(dt) => dt,
        None => {
            warn!(column = column, value = ?value, "Unparseable stored timestamp, using current time");
            Utc::now()
        }
    }
}

/// Parse datetime string from SQLite
fn parse_datetime(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| {
                // Try parsing SQLite's datetime format
                chrono::NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .map(|dt| dt.and_utc())
            })
    })
}
