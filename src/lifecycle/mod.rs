//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Run migrations (best effort) → Build state → Bind listener
//!
//! Migrations (migrations.rs):
//!     Launch external tool → capture output → true | false
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → broadcast → server drains and exits
//! ```
//!
//! # Design Decisions
//! - A failed migration is downgraded to a warning; startup continues
//! - Listener binds last (traffic only once state is built)

pub mod migrations;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
