//! Authentication handlers

use crate::extractors::AuthUser;
use crate::handlers::ApiError;
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use papeleria_types::{AuthToken, User, UserLogin, UserRegistration};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    token: AuthToken,
    user: User,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<UserRegistration>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    info!("Registration attempt for: {}", req.email);
    let user = state.auth_service.register(&req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<UserLogin>,
) -> Result<Json<LoginResponse>, ApiError> {
    info!("Login attempt for: {}", req.email);
    let (user, token) = state.auth_service.login(&req).await?;
    info!("Login successful for: {}", user.email);
    Ok(Json(LoginResponse { token, user }))
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<User>, ApiError> {
    state
        .auth_service
        .current_user(auth.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))
}
