//! Hero resource types.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// A stored hero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Hero {
    pub id: i64,
    pub name: String,
    pub secret_name: String,
    pub age: Option<i32>,
}

/// Payload for `POST /heroes`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct HeroCreate {
    pub name: String,
    pub secret_name: String,
    #[serde(default)]
    pub age: Option<i32>,
}

/// Payload for `PATCH /heroes/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct HeroUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub secret_name: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
}

pub const DEFAULT_PAGE_LIMIT: i64 = 100;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// `offset`/`limit` query parameters for listing heroes.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Rows to skip.
    #[serde(default)]
    pub offset: i64,
    /// Rows to return, at most 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}
