//! moneyflow-auth - Credential and session-token service for the MoneyFlow API
//!
//! This crate registers identities with argon2-hashed passwords, issues signed
//! access and refresh tokens on login, revokes refresh tokens on logout and
//! authorizes bearer tokens on protected routes.

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod server;
