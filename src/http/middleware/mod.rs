//! Request middleware.

pub mod fault_tolerance;

pub use fault_tolerance::{fault_tolerance, is_safe_path, Failure, FailureKind, FaultTolerance};
