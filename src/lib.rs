//! Hero API library: a fault-tolerant axum service over Postgres.

pub mod auth;
pub mod config;
pub mod doc;
pub mod error;
pub mod health;
pub mod heroes;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod persistence;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
