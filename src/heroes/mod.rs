//! Hero resource: CRUD over the `heroes` table.

pub mod handlers;
pub mod types;

use axum::{routing::get, Router};

use crate::http::server::AppState;

use self::handlers::*;

/// Routes mounted under `/heroes`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/heroes", get(list_heroes).post(create_hero))
        .route(
            "/heroes/{id}",
            get(get_hero).patch(update_hero).delete(delete_hero),
        )
}
