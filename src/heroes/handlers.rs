//! `/heroes` route handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::heroes::types::{Hero, HeroCreate, HeroUpdate, Pagination, MAX_PAGE_LIMIT};
use crate::http::response::{DatabaseErrorBody, DetailBody};
use crate::http::server::AppState;

fn not_found() -> AppError {
    AppError::NotFound("Hero not found".to_string())
}

/// `GET /heroes`
#[utoipa::path(
    get,
    path = "/heroes",
    tags = ["heroes"],
    params(Pagination),
    responses(
        (status = 200, description = "Page of heroes", body = [Hero]),
        (status = 422, description = "Pagination out of range", body = DetailBody),
        (status = 503, description = "Database unavailable", body = DatabaseErrorBody)
    )
)]
pub async fn list_heroes(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<Hero>>> {
    if page.offset < 0 || page.limit < 0 || page.limit > MAX_PAGE_LIMIT {
        return Err(AppError::Validation(format!(
            "offset must be >= 0 and limit between 0 and {MAX_PAGE_LIMIT}"
        )));
    }
    Ok(Json(state.heroes.list(page).await?))
}

/// `POST /heroes`
#[utoipa::path(
    post,
    path = "/heroes",
    tags = ["heroes"],
    request_body = HeroCreate,
    responses(
        (status = 201, description = "Hero created", body = Hero),
        (status = 422, description = "Missing name or secret name", body = DetailBody),
        (status = 503, description = "Database unavailable", body = DatabaseErrorBody)
    )
)]
pub async fn create_hero(
    State(state): State<AppState>,
    Json(hero): Json<HeroCreate>,
) -> AppResult<(StatusCode, Json<Hero>)> {
    if hero.name.trim().is_empty() || hero.secret_name.trim().is_empty() {
        return Err(AppError::Validation("name and secret_name are required".to_string()));
    }
    let hero = state.heroes.create(hero).await?;
    tracing::debug!(hero_id = hero.id, "Hero created");
    Ok((StatusCode::CREATED, Json(hero)))
}

/// `GET /heroes/{id}`
#[utoipa::path(
    get,
    path = "/heroes/{id}",
    tags = ["heroes"],
    params(("id" = i64, Path, description = "Hero id")),
    responses(
        (status = 200, description = "The hero", body = Hero),
        (status = 404, description = "Hero not found", body = DetailBody),
        (status = 503, description = "Database unavailable", body = DatabaseErrorBody)
    )
)]
pub async fn get_hero(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Hero>> {
    state.heroes.get(id).await?.map(Json).ok_or_else(not_found)
}

/// `PATCH /heroes/{id}`
#[utoipa::path(
    patch,
    path = "/heroes/{id}",
    tags = ["heroes"],
    params(("id" = i64, Path, description = "Hero id")),
    request_body = HeroUpdate,
    responses(
        (status = 200, description = "Updated hero", body = Hero),
        (status = 404, description = "Hero not found", body = DetailBody),
        (status = 503, description = "Database unavailable", body = DatabaseErrorBody)
    )
)]
pub async fn update_hero(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(changes): Json<HeroUpdate>,
) -> AppResult<Json<Hero>> {
    state
        .heroes
        .update(id, changes)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// `DELETE /heroes/{id}`
#[utoipa::path(
    delete,
    path = "/heroes/{id}",
    tags = ["heroes"],
    params(("id" = i64, Path, description = "Hero id")),
    responses(
        (status = 200, description = "Hero deleted"),
        (status = 404, description = "Hero not found", body = DetailBody),
        (status = 503, description = "Database unavailable", body = DatabaseErrorBody)
    )
)]
pub async fn delete_hero(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Value>> {
    if state.heroes.delete(id).await? {
        tracing::debug!(hero_id = id, "Hero deleted");
        Ok(Json(json!({ "ok": true })))
    } else {
        Err(not_found())
    }
}
