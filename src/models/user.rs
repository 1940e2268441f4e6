//! Identity model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A registered user as stored by the credential store
///
/// The password hash is skipped on serialization and redacted from `Debug`.
/// There is deliberately no `PartialEq`: hashes are only ever checked through
/// [`crate::auth::verify_password`].
#[derive(Clone, Serialize)]
pub struct Identity {
    /// Unique numeric identifier, assigned by the store
    pub id: i64,

    /// Unique email, case-sensitive as stored
    pub email: String,

    /// Argon2id PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the identity was created
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Create a new identity value
    pub fn new(id: i64, email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}
