//! # Auth Routes
//!
//! Register, login, and session introspection.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;
use patungan_core::validation::{validate_email, validate_participant_name, validate_password};
use patungan_core::{CoreError, User};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    debug!(email = %req.email, "register request");

    validate_participant_name(&req.name).map_err(CoreError::from)?;
    validate_email(&req.email).map_err(CoreError::from)?;
    validate_password(&req.password).map_err(CoreError::from)?;

    let password_hash = hash_password(&req.password)?;
    let record = state
        .db
        .users()
        .create(req.name.trim(), req.email.trim(), &password_hash)
        .await?;

    let token = state.jwt.issue_token(&record.id, &record.email)?;

    info!(user_id = %record.id, "Account registered");

    Ok(Json(AuthResponse {
        token,
        user: record.user(),
    }))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    debug!(email = %req.email, "login request");

    let record = state
        .db
        .users()
        .find_by_email(req.email.trim())
        .await?
        // Same message as a bad password: never confirm whether an
        // address has an account
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !verify_password(&req.password, &record.password_hash) {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = state.jwt.issue_token(&record.id, &record.email)?;

    info!(user_id = %record.id, "Login");

    Ok(Json(AuthResponse {
        token,
        user: record.user(),
    }))
}

/// `GET /api/auth/me`
pub async fn me(user: AuthUser) -> Json<User> {
    Json(User {
        id: user.id,
        name: user.name,
        email: user.email,
    })
}
