//! Bearer token authorization

use std::sync::Arc;

use tracing::debug;

use crate::error::AuthError;

use super::token::TokenIssuer;

/// Resolves an `Authorization` header to the id of the authenticated user
#[derive(Debug, Clone)]
pub struct AuthorizationGuard {
    issuer: Arc<TokenIssuer>,
}

impl AuthorizationGuard {
    pub fn new(issuer: Arc<TokenIssuer>) -> Self {
        Self { issuer }
    }

    /// Authorize a request from its `Authorization` header value
    ///
    /// The header must be exactly `Bearer <token>` and the token must verify.
    /// Every failure is reported as [`AuthError::Unauthenticated`].
    pub fn authorize(&self, header: &str) -> Result<i64, AuthError> {
        let token = parse_bearer(header).ok_or(AuthError::Unauthenticated)?;

        match self.issuer.verify(token) {
            Ok(claims) => Ok(claims.user_id),
            Err(e) => {
                debug!(error = %e, "Bearer token rejected");
                Err(AuthError::Unauthenticated)
            }
        }
    }
}

/// Extract the token from a `Bearer <token>` header value
///
/// The scheme is case-sensitive and exactly one space must separate it from
/// a non-empty token.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}
