//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and the database URL
//! - Validate value ranges (timeouts > 0, pool size > 0)
//! - Reject token settings that cannot sign anything
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("invalid database url: {0}")]
    DatabaseUrl(String),

    #[error("database.max_connections must be greater than zero")]
    ZeroPoolSize,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("auth.jwt_secret must not be empty")]
    EmptyJwtSecret,

    #[error("unsupported jwt algorithm '{0}', expected HS256, HS384 or HS512")]
    JwtAlgorithm(String),

    #[error("auth.jwt_expiration_minutes must be greater than zero")]
    JwtExpiration,

    #[error("migrations.program must not be empty when migrations are enabled")]
    EmptyMigrationProgram,
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    match Url::parse(&config.database.url) {
        Ok(url) if matches!(url.scheme(), "postgres" | "postgresql") => {}
        Ok(url) => errors.push(ValidationError::DatabaseUrl(format!(
            "unsupported scheme '{}'",
            url.scheme()
        ))),
        Err(e) => errors.push(ValidationError::DatabaseUrl(e.to_string())),
    }

    if config.database.max_connections == 0 {
        errors.push(ValidationError::ZeroPoolSize);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.auth.jwt_secret.is_empty() {
        errors.push(ValidationError::EmptyJwtSecret);
    }

    match Algorithm::from_str(&config.auth.jwt_algorithm) {
        Ok(Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) => {}
        _ => errors.push(ValidationError::JwtAlgorithm(config.auth.jwt_algorithm.clone())),
    }

    if config.auth.jwt_expiration_minutes <= 0 {
        errors.push(ValidationError::JwtExpiration);
    }

    if config.migrations.enabled && config.migrations.program.trim().is_empty() {
        errors.push(ValidationError::EmptyMigrationProgram);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.database.url = "mysql://localhost/heroes".into();
        config.auth.jwt_secret.clear();
        config.auth.jwt_algorithm = "RS256".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::EmptyJwtSecret));
        assert!(errors.contains(&ValidationError::ZeroRequestTimeout));
        assert!(errors.contains(&ValidationError::JwtAlgorithm("RS256".into())));
    }

    #[test]
    fn postgresql_scheme_is_accepted() {
        let mut config = AppConfig::default();
        config.database.url = "postgresql://user:pw@db.internal:5432/app".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn disabled_migrations_skip_program_check() {
        let mut config = AppConfig::default();
        config.migrations.program = String::new();
        assert!(validate_config(&config).is_err());

        config.migrations.enabled = false;
        assert!(validate_config(&config).is_ok());
    }
}
