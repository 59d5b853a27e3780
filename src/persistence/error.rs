//! Persistence error taxonomy.
//!
//! Anything the driver or pool raises is a [`DbError`]; the middleware keys
//! its degraded responses off that distinction, so new driver failures must
//! land in `DbError`, not in `PersistenceError::Other`.

use thiserror::Error;

/// Failure raised by the database driver or its connection pool.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DbError {
    /// Could not reach the server, or the connection dropped.
    #[error("database connection failed: {0}")]
    Connection(String),

    /// Pool checkout or statement timed out.
    #[error("database operation timed out: {0}")]
    Timeout(String),

    /// The server rejected the statement (constraint, syntax, permissions).
    #[error("database query failed: {0}")]
    Query(String),

    /// Protocol, decoding or other driver-level fault.
    #[error("database driver error: {0}")]
    Driver(String),
}

/// Error returned by repository and [`Database`](super::Database) calls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    #[error(transparent)]
    Database(#[from] DbError),

    /// Failure outside the driver while servicing a persistence call.
    #[error("{0}")]
    Other(String),
}

impl From<sqlx::Error> for DbError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut => DbError::Timeout("timed out acquiring a pooled connection".into()),
            sqlx::Error::PoolClosed => DbError::Connection("connection pool is closed".into()),
            sqlx::Error::Io(e) => DbError::Connection(e.to_string()),
            sqlx::Error::Tls(e) => DbError::Connection(e.to_string()),
            sqlx::Error::Configuration(e) => DbError::Connection(e.to_string()),
            sqlx::Error::WorkerCrashed => DbError::Connection("connection worker crashed".into()),
            sqlx::Error::Database(e) => DbError::Query(e.message().to_string()),
            other => DbError::Driver(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for PersistenceError {
    fn from(error: sqlx::Error) -> Self {
        PersistenceError::Database(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_failures_are_database_errors() {
        assert!(matches!(
            PersistenceError::from(sqlx::Error::PoolTimedOut),
            PersistenceError::Database(DbError::Timeout(_))
        ));
        assert!(matches!(
            PersistenceError::from(sqlx::Error::PoolClosed),
            PersistenceError::Database(DbError::Connection(_))
        ));
    }

    #[test]
    fn io_failure_is_a_connection_error() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        assert_eq!(
            DbError::from(sqlx::Error::Io(io)),
            DbError::Connection("connection refused".into())
        );
    }

    #[test]
    fn row_not_found_is_a_driver_error() {
        assert!(matches!(DbError::from(sqlx::Error::RowNotFound), DbError::Driver(_)));
    }
}
