//! Database liveness probe.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::persistence::{Database, PersistenceError};

/// Version reported by `/` and `/health`.
pub const API_VERSION: &str = "1.0.0";

const PROBE_QUERY: &str = "SELECT 1";

/// Persistence state as seen by the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Connected,
    Disconnected,
    Error,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthReport {
    pub api_status: String,
    pub database_status: DatabaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub version: String,
}

impl HealthReport {
    pub fn new(database_status: DatabaseStatus) -> Self {
        Self {
            api_status: "ok".to_string(),
            database_status,
            error: None,
            version: API_VERSION.to_string(),
        }
    }

    /// Report served when a database failure escapes the health route itself.
    pub fn degraded() -> Self {
        Self {
            error: Some("Database connection failed".to_string()),
            ..Self::new(DatabaseStatus::Error)
        }
    }
}

/// Probe the database with a trivial round trip. Never fails.
pub async fn check(database: &dyn Database) -> HealthReport {
    let status = match database.execute(PROBE_QUERY).await {
        Ok(_) => DatabaseStatus::Connected,
        Err(PersistenceError::Database(e)) => {
            tracing::error!(error = %e, "Database connection failed");
            DatabaseStatus::Disconnected
        }
        Err(PersistenceError::Other(e)) => {
            tracing::error!(error = %e, "Unexpected error checking database");
            DatabaseStatus::Error
        }
    };

    metrics::record_database_status(status == DatabaseStatus::Connected);
    HealthReport::new(status)
}

/// `GET /health`
#[utoipa::path(
    get,
    path = "/health",
    tags = ["health"],
    responses(
        (status = 200, description = "API is up; database state in the body", body = HealthReport)
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthReport> {
    Json(check(state.database.as_ref()).await)
}
