//! Session token models
//!
//! This module defines the persisted refresh token record and the token pair
//! handed out at login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Refresh token stored in database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Row ID
    pub id: i64,

    /// Owning identity
    pub user_id: i64,

    /// The signed token string, unique across all records
    pub token: String,

    /// When the token expires
    pub expires_at: DateTime<Utc>,

    /// When the token was issued
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Check whether the record's expiry has passed
    ///
    /// Logout does not consult this; a record stays deletable after expiry.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Access and refresh token returned by a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived bearer token
    pub access_token: String,

    /// Long-lived token whose record enables revocation
    pub refresh_token: String,
}
