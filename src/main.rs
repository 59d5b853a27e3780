//! Hero API
//!
//! An axum service exposing health, authentication and hero endpoints,
//! built to keep answering while its database is unavailable.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ trace / request id / metrics / limits / CORS
//!                         │
//!                         ▼
//!                  ┌──────────────────┐   Ok        ┌──────────────┐
//!                  │ fault tolerance  │◀────────────│ route handler│──▶ Postgres
//!                  │   middleware     │──dispatch──▶│ / health /   │
//!                  └──────────────────┘   Err(..)   │ auth / heroes│
//!                         │                         └──────────────┘
//!                         ▼
//!     Client Response ◀── pass-through │ degraded 200 │ 503 │ 500
//! ```
//!
//! Startup: load config → migrations (best effort) → lazy pool → serve.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use hero_api::config::load_config_with;
use hero_api::lifecycle::startup::migrate_on_startup;
use hero_api::observability::{logging, metrics};
use hero_api::persistence::PgStore;
use hero_api::{AppState, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "hero-api")]
#[command(about = "Fault-tolerant hero and auth API", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults plus environment when omitted.
    #[arg(short, long, env = "HERO_API_CONFIG")]
    config: Option<PathBuf>,

    /// Do not run the migration tool on startup.
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config_with(cli.config.as_deref(), |config| {
        if cli.skip_migrations {
            config.migrations.enabled = false;
        }
    })?;

    logging::init_logging(config.debug, config.observability.log_format);

    tracing::info!(
        project = %config.project_name,
        version = env!("CARGO_PKG_VERSION"),
        "hero-api starting"
    );

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        migrations = config.migrations.enabled,
        "Configuration loaded"
    );

    migrate_on_startup(&config).await;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = PgStore::connect_lazy(&config.database)?;
    let state = AppState::new(store.clone(), &config);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config, state);
    server.run(listener, shutdown.subscribe()).await?;

    store.close().await;
    tracing::info!("Database pool closed");

    tracing::info!("Shutdown complete");
    Ok(())
}
