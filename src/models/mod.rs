//! Domain models for moneyflow-auth
//!
//! This module contains the core domain models used throughout the application.

pub mod request;
pub mod token;
pub mod user;

// Re-export commonly used types
pub use request::{CredentialsRequest, IdentityResponse, LogoutRequest, MessageResponse};
pub use token::{RefreshTokenRecord, TokenPair};
pub use user::Identity;
