//! Health reporting subsystem.
//!
//! # Data Flow
//! ```text
//! GET /health
//!     → probe.rs: Database::execute("SELECT 1")
//!     → connected | disconnected | error
//!     → 200 HealthReport
//!
//! Database failure escaping a /health dispatch:
//!     → fault-tolerance middleware answers HealthReport::degraded()
//! ```
//!
//! # Design Decisions
//! - The probe never fails the request; status lives in the body
//! - Driver failures and other failures are reported differently

pub mod probe;

pub use probe::{check, health_handler, DatabaseStatus, HealthReport, API_VERSION};
