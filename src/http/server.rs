//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers and the API docs
//! - Wrap route dispatch in the fault-tolerance middleware
//! - Wire up outer middleware (trace, request ID, metrics, timeout, limits, CORS)
//! - Serve on a listener until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::HeaderValue,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{self, TokenService};
use crate::config::{AppConfig, CorsConfig};
use crate::doc::{ApiDoc, DOCS_PATH, OPENAPI_PATH};
use crate::health::{health_handler, API_VERSION};
use crate::heroes;
use crate::http::middleware::{fault_tolerance, FaultTolerance};
use crate::http::request;
use crate::observability::metrics;
use crate::persistence::{Database, HeroRepository, UserRepository};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub database: Arc<dyn Database>,
    pub heroes: Arc<dyn HeroRepository>,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<TokenService>,
    pub welcome: Arc<str>,
}

impl AppState {
    /// Build state where one store serves the probe and both repositories.
    pub fn new<S>(store: S, config: &AppConfig) -> Self
    where
        S: Database + HeroRepository + UserRepository + 'static,
    {
        let store = Arc::new(store);
        Self {
            database: store.clone(),
            heroes: store.clone(),
            users: store,
            tokens: Arc::new(TokenService::new(&config.auth)),
            welcome: config.messages.welcome.as_str().into(),
        }
    }
}

/// HTTP server for the API.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let policy = Arc::new(FaultTolerance::new(&config.messages));

        let mut router = Router::new()
            .route("/", get(root))
            .route("/health", get(health_handler))
            .merge(auth::router())
            .merge(heroes::router())
            .merge(SwaggerUi::new(DOCS_PATH).url(OPENAPI_PATH, ApiDoc::openapi()))
            .with_state(state)
            .layer(axum::middleware::from_fn_with_state(policy, fault_tolerance));

        if config.cors.enabled {
            router = router.layer(cors_layer(&config.cors));
        }

        router.layer(
            ServiceBuilder::new()
                .layer(request::set_request_id())
                .layer(TraceLayer::new_for_http().make_span_with(request::make_span))
                .layer(request::propagate_request_id())
                .layer(axum::middleware::from_fn(metrics::track_requests))
                .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
        )
    }

    /// Run the server, accepting connections on the given listener until
    /// the shutdown channel fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            project = %self.config.project_name,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if config.allow_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            config
                .allow_origins
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// `GET /`. Never touches the database.
#[utoipa::path(
    get,
    path = "/",
    tags = ["health"],
    responses((status = 200, description = "Welcome message and links"))
)]
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    tracing::debug!("Root endpoint called");
    Json(json!({
        "message": &*state.welcome,
        "docs": DOCS_PATH,
        "health": "/health",
        "version": API_VERSION,
    }))
}
