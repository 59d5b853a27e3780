//! Fault-tolerant request middleware.
//!
//! # Responsibilities
//! - Dispatch every request exactly once to the rest of the pipeline
//! - Classify the outcome: success, database failure, unhandled failure
//! - Keep safe routes available while the database is down
//! - Replace failures with stable JSON envelopes (503 / 500)
//!
//! # Outcome handling
//! ```text
//! Dispatched ─┬─ Ok(response)            → response, untouched
//!             ├─ Err(Database), safe     → /health: 200 degraded report
//!             │                          → other:   one re-dispatch
//!             ├─ Err(Database), not safe → 503 database_error
//!             └─ Err(Unhandled)          → 500 (path not consulted)
//! ```
//!
//! # Design Decisions
//! - Handlers report failures as a [`Failure`] in response extensions;
//!   a panic in the handler counts as an unhandled failure
//! - The safe-route re-dispatch happens at most once; if it fails too it is
//!   answered with the non-safe rules
//! - Request bodies are buffered only when a re-dispatch is possible

use std::any::Any;
use std::backtrace::Backtrace;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use futures_util::FutureExt;
use http_body_util::LengthLimitError;

use crate::config::MessagesConfig;
use crate::health::HealthReport;
use crate::http::response;

/// Health route; answered with a degraded report instead of re-dispatching.
pub const HEALTH_PATH: &str = "/health";

/// Routes that must stay reachable regardless of database state.
pub const SAFE_PATHS: [&str; 5] = ["/", "/health", "/docs", "/redoc", "/openapi.json"];

/// Authentication routes, treated as safe.
pub const AUTH_PATHS: [&str; 3] = ["/auth/register", "/auth/login", "/auth/me"];

/// Prefix of static assets, treated as safe.
pub const STATIC_PREFIX: &str = "/static/";

/// Whether a database failure on this path must not surface as a 503.
pub fn is_safe_path(path: &str) -> bool {
    SAFE_PATHS.contains(&path) || AUTH_PATHS.contains(&path) || path.starts_with(STATIC_PREFIX)
}

/// Category of a failed dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Raised by the persistence layer.
    Database,
    /// Anything else, including panics.
    Unhandled,
}

/// A failed dispatch, as reported by the downstream handler.
#[derive(Debug, Clone)]
pub struct Failure {
    kind: FailureKind,
    message: String,
    trace: Arc<Backtrace>,
}

impl Failure {
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Database, message)
    }

    pub fn unhandled(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Unhandled, message)
    }

    fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            trace: Arc::new(Backtrace::capture()),
        }
    }

    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "handler panicked".to_string()
        };
        Self::unhandled(format!("handler panicked: {message}"))
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Backtrace captured where the failure was created. Empty unless
    /// `RUST_BACKTRACE` is set.
    pub fn trace(&self) -> &Backtrace {
        &self.trace
    }
}

/// Result of one downstream dispatch.
pub type Dispatch = Result<Response, Failure>;

/// Turn a handler response into a dispatch result by looking for a
/// [`Failure`] marker.
pub fn classify(response: Response) -> Dispatch {
    match response.extensions().get::<Failure>() {
        Some(failure) => Err(failure.clone()),
        None => Ok(response),
    }
}

/// The classification policy, holding the localized envelope messages.
#[derive(Debug, Clone)]
pub struct FaultTolerance {
    database_unavailable: String,
    internal_error: String,
}

impl FaultTolerance {
    pub fn new(messages: &MessagesConfig) -> Self {
        Self {
            database_unavailable: messages.database_unavailable.clone(),
            internal_error: messages.internal_error.clone(),
        }
    }

    /// Run `dispatch` for a request on `path` and decide the response.
    ///
    /// `dispatch` is invoked once, and a second time only for a database
    /// failure on a safe path other than [`HEALTH_PATH`].
    pub async fn handle<F, Fut>(&self, path: &str, mut dispatch: F) -> Response
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Dispatch>,
    {
        let safe = is_safe_path(path);

        let failure = match dispatch().await {
            Ok(response) => return response,
            Err(failure) => failure,
        };
        log_failure(path, &failure);

        match failure.kind() {
            FailureKind::Database if safe => {
                tracing::warn!(path = %path, "Critical route affected by database error");

                if path == HEALTH_PATH {
                    return (StatusCode::OK, Json(HealthReport::degraded())).into_response();
                }

                match dispatch().await {
                    Ok(response) => response,
                    Err(second) => {
                        log_failure(path, &second);
                        tracing::warn!(path = %path, "Critical route failed again after re-dispatch");
                        self.envelope(&second)
                    }
                }
            }
            _ => self.envelope(&failure),
        }
    }

    fn envelope(&self, failure: &Failure) -> Response {
        match failure.kind() {
            FailureKind::Database => response::database_unavailable(&self.database_unavailable),
            FailureKind::Unhandled => response::internal_error(&self.internal_error),
        }
    }
}

fn log_failure(path: &str, failure: &Failure) {
    match failure.kind() {
        FailureKind::Database => {
            tracing::error!(path = %path, error = %failure.message(), "Database error");
        }
        FailureKind::Unhandled => {
            tracing::error!(path = %path, error = %failure.message(), "Unhandled error");
        }
    }
    tracing::debug!(path = %path, trace = %failure.trace(), "Traceback");
}

/// Source of the request for each dispatch.
enum Replay {
    /// Not replayable; the request is handed out once.
    Once(Option<Request>),
    /// Body buffered so the request can be rebuilt.
    Buffered { parts: Parts, body: Bytes },
}

impl Replay {
    fn next_request(&mut self) -> Option<Request> {
        match self {
            Replay::Once(request) => request.take(),
            Replay::Buffered { parts, body } => {
                let mut request = Request::new(Body::from(body.clone()));
                *request.method_mut() = parts.method.clone();
                *request.uri_mut() = parts.uri.clone();
                *request.version_mut() = parts.version;
                *request.headers_mut() = parts.headers.clone();
                *request.extensions_mut() = parts.extensions.clone();
                Some(request)
            }
        }
    }
}

async fn run(next: Next, request: Request) -> Dispatch {
    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => classify(response),
        Err(panic) => Err(Failure::from_panic(panic)),
    }
}

/// Whether buffering failed because the outer body limit was hit.
fn exceeds_length_limit(error: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

/// axum middleware applying [`FaultTolerance`] around route dispatch.
pub async fn fault_tolerance(
    State(policy): State<Arc<FaultTolerance>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    let mut replay = if is_safe_path(&path) && path != HEALTH_PATH {
        let (parts, body) = request.into_parts();
        match axum::body::to_bytes(body, usize::MAX).await {
            Ok(body) => Replay::Buffered { parts, body },
            Err(e) if exceeds_length_limit(&e) => {
                tracing::warn!(path = %path, "Request body over the size limit");
                return response::detail(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Failed to read request body");
                return response::detail(StatusCode::BAD_REQUEST, "Could not read request body");
            }
        }
    } else {
        Replay::Once(Some(request))
    };

    policy
        .handle(&path, move || {
            let request = replay.next_request();
            let next = next.clone();
            async move {
                match request {
                    Some(request) => run(next, request).await,
                    None => Err(Failure::unhandled("request cannot be dispatched twice")),
                }
            }
        })
        .await
}
