//! Account registration and token authentication.
//!
//! # Responsibilities
//! - Register accounts with Argon2 password hashes
//! - Exchange credentials for a bearer JWT
//! - Resolve the current user from a bearer token

pub mod handlers;
pub mod password;
pub mod token;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};

use crate::http::server::AppState;

pub use token::TokenService;

/// Routes mounted under `/auth`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/me", get(handlers::me))
}
