//! `/auth` route handlers.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::types::{LoginData, NewUser, Token, UserCreate, UserResponse};
use crate::error::{AppError, AppResult};
use crate::http::response::{DetailBody, InternalErrorBody};
use crate::http::server::AppState;

const MIN_PASSWORD_LEN: usize = 8;

fn validate_registration(data: &UserCreate) -> AppResult<()> {
    let email = data.email.trim();
    let valid_email = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid_email {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    if data.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// `POST /auth/register`
#[utoipa::path(
    post,
    path = "/auth/register",
    tags = ["auth"],
    request_body = UserCreate,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 409, description = "Email already registered", body = DetailBody),
        (status = 422, description = "Invalid email or password", body = DetailBody),
        (status = 500, description = "Internal server error", body = InternalErrorBody)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(data): Json<UserCreate>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    validate_registration(&data)?;
    let email = data.email.trim().to_lowercase();
    tracing::debug!(email = %email, "Registering user");

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password(data.password).await?;
    let user = state
        .users
        .create(NewUser {
            email,
            full_name: data.full_name,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `POST /auth/login`
#[utoipa::path(
    post,
    path = "/auth/login",
    tags = ["auth"],
    request_body = LoginData,
    responses(
        (status = 200, description = "Bearer token", body = Token),
        (status = 401, description = "Incorrect email or password", body = DetailBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(data): Json<LoginData>,
) -> AppResult<Json<Token>> {
    let email = data.email.trim().to_lowercase();
    tracing::debug!(email = %email, "Login attempt");

    let invalid = || AppError::Unauthorized("Incorrect email or password".to_string());

    let user = state.users.find_by_email(&email).await?.ok_or_else(invalid)?;
    if !verify_password(data.password, user.password_hash.clone()).await? {
        return Err(invalid());
    }

    let token = state.tokens.issue(&user)?;
    Ok(Json(Token::bearer(token)))
}

/// `GET /auth/me`
#[utoipa::path(
    get,
    path = "/auth/me",
    tags = ["auth"],
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = DetailBody)
    )
)]
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<UserResponse>> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    let claims = state.tokens.verify(token.trim())?;
    let id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::Unauthorized("Could not validate credentials".to_string()))?;

    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".to_string()))?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(email: &str, password: &str) -> UserCreate {
        UserCreate {
            email: email.into(),
            password: password.into(),
            full_name: None,
        }
    }

    #[test]
    fn test_registration_validation() {
        assert!(validate_registration(&payload("ada@example.com", "longenough")).is_ok());
        assert!(validate_registration(&payload("not-an-email", "longenough")).is_err());
        assert!(validate_registration(&payload("@example.com", "longenough")).is_err());
        assert!(validate_registration(&payload("ada@example.com", "short")).is_err());
    }
}
