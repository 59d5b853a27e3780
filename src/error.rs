//! Handler error type.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::config::schema::{DEFAULT_DATABASE_UNAVAILABLE_MESSAGE, DEFAULT_INTERNAL_ERROR_MESSAGE};
use crate::http::middleware::fault_tolerance::Failure;
use crate::http::response;
use crate::persistence::{DbError, PersistenceError};

/// Errors a handler may return.
///
/// Domain variants render directly. `Database` and `Internal` render a
/// fallback envelope and tag the response with a [`Failure`] so the
/// fault-tolerance middleware can classify and replace it.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error("{0}")]
    Internal(String),
}

/// Result type for handlers.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal(message.into())
    }
}

impl From<PersistenceError> for AppError {
    fn from(error: PersistenceError) -> Self {
        match error {
            PersistenceError::Database(e) => AppError::Database(e),
            PersistenceError::Other(message) => AppError::Internal(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(detail) => response::detail(StatusCode::NOT_FOUND, detail),
            AppError::Conflict(detail) => response::detail(StatusCode::CONFLICT, detail),
            AppError::Validation(detail) => {
                response::detail(StatusCode::UNPROCESSABLE_ENTITY, detail)
            }
            AppError::Unauthorized(detail) => {
                let mut response = response::detail(StatusCode::UNAUTHORIZED, detail);
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            AppError::Database(e) => {
                let mut response = response::database_unavailable(DEFAULT_DATABASE_UNAVAILABLE_MESSAGE);
                response.extensions_mut().insert(Failure::database(e.to_string()));
                response
            }
            AppError::Internal(message) => {
                let mut response = response::internal_error(DEFAULT_INTERNAL_ERROR_MESSAGE);
                response.extensions_mut().insert(Failure::unhandled(message));
                response
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::middleware::fault_tolerance::FailureKind;

    #[test]
    fn domain_errors_are_not_failures() {
        let response = AppError::NotFound("Hero not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<Failure>().is_none());
    }

    #[test]
    fn database_errors_carry_a_failure_marker() {
        let response = AppError::Database(DbError::Connection("refused".into())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let failure = response.extensions().get::<Failure>().unwrap();
        assert_eq!(failure.kind(), FailureKind::Database);
        assert_eq!(failure.message(), "database connection failed: refused");
    }

    #[test]
    fn other_persistence_errors_are_internal() {
        let error: AppError = PersistenceError::Other("join error".into()).into();
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.extensions().get::<Failure>().map(Failure::kind),
            Some(FailureKind::Unhandled)
        );
    }

    #[test]
    fn unauthorized_sets_challenge_header() {
        let response = AppError::Unauthorized("Invalid token".into()).into_response();
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }
}
