//! Request and response bodies for the HTTP surface

use serde::{Deserialize, Serialize};

/// Email and password, used by both `/register` and `/login`
#[derive(Clone, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl CredentialsRequest {
    /// Basic shape check: both fields present and the email looks like one
    pub fn is_well_formed(&self) -> bool {
        !self.password.is_empty() && looks_like_email(&self.email)
    }
}

/// Body of `/logout`
#[derive(Debug, Clone, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

impl LogoutRequest {
    pub fn is_well_formed(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

/// Generic `{"message": ...}` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn ok() -> Self {
        Self::new("ok")
    }
}

/// Body of `/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityResponse {
    pub user_id: i64,
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
