//! Startup orchestration.
//!
//! # Responsibilities
//! - Run the migration hook once, before the listener binds
//! - Build application state from configuration
//!
//! # Design Decisions
//! - Migration failure never aborts startup; the API keeps serving with
//!   whatever schema exists
//! - The pool connects lazily, so an unreachable database does not block

use std::sync::Arc;

use crate::config::AppConfig;
use crate::lifecycle::migrations::{run_migrations, CommandRunner, MigrationCommand, SystemRunner};

/// Run the migration hook on the blocking pool. Returns the hook's result;
/// `false` is only ever logged.
pub async fn migrate_on_startup(config: &AppConfig) -> bool {
    migrate_with(config, Arc::new(SystemRunner)).await
}

/// [`migrate_on_startup`] with an injected runner.
pub async fn migrate_with<R>(config: &AppConfig, runner: Arc<R>) -> bool
where
    R: CommandRunner + Send + Sync + 'static,
{
    if !config.migrations.enabled {
        tracing::info!("Startup migrations disabled");
        return true;
    }

    let command = MigrationCommand::from_config(&config.migrations, &config.database.url);
    let success = tokio::task::spawn_blocking(move || run_migrations(runner.as_ref(), &command))
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Migration task failed");
            false
        });

    if !success {
        tracing::warn!(
            "Database migrations failed but API will continue to function with limited capabilities"
        );
    }
    success
}
