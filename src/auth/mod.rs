//! Authentication system for moneyflow-auth
//!
//! This module provides authentication and authorization functionality:
//! - Password strength policy
//! - Password hashing and verification
//! - Session token issuing and verification
//! - Bearer token authorization
//! - Registration, login and logout

pub mod guard;
pub mod password;
pub mod policy;
pub mod service;
pub mod token;

pub use guard::{parse_bearer, AuthorizationGuard};
pub use password::{hash_password, verify_password, HashError};
pub use policy::{is_strong_password, MIN_PASSWORD_LENGTH};
pub use service::{AuthConfig, AuthService, DEFAULT_STORE_TIMEOUT};
pub use token::{
    generate_token_id, TokenClaims, TokenIssuer, ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL,
};
