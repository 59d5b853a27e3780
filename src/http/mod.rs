//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, outer layers)
//!     → request.rs (request ID, span)
//!     → middleware/fault_tolerance.rs (classify handler outcome)
//!     → route handler (/, /health, /auth/*, /heroes/*)
//!     → response.rs (error envelopes)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
