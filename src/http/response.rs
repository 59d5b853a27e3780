//! Response envelopes.
//!
//! # Responsibilities
//! - Build the classified error envelopes (503 database, 500 internal)
//! - Build `{"detail": ...}` bodies for domain errors
//!
//! # Design Decisions
//! - Shapes are stable so callers can branch on `type`/`detail`
//! - No internal error text ever reaches a 500/503 body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of a 503 returned when the persistence layer failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DatabaseErrorBody {
    pub detail: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Body of a 500 returned for any other failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InternalErrorBody {
    pub detail: String,
    pub message: String,
}

/// Body used for domain errors (404, 401, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DetailBody {
    pub detail: String,
}

/// `503 {"detail": "Database service unavailable", "message": .., "type": "database_error"}`
pub fn database_unavailable(message: &str) -> Response {
    let body = DatabaseErrorBody {
        detail: "Database service unavailable".to_string(),
        message: message.to_string(),
        kind: "database_error".to_string(),
    };
    (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
}

/// `500 {"detail": "Internal server error", "message": ..}`
pub fn internal_error(message: &str) -> Response {
    let body = InternalErrorBody {
        detail: "Internal server error".to_string(),
        message: message.to_string(),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// `{"detail": ..}` with the given status.
pub fn detail(status: StatusCode, detail: impl Into<String>) -> Response {
    (status, Json(DetailBody { detail: detail.into() })).into_response()
}
