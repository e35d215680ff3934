//! Auth extractor for protected routes

use crate::handlers::error::ApiError;
use crate::AppState;
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::debug;

/// Authenticated user, resolved from an `Authorization: Bearer` header
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Invalid Authorization format"))?;

        let user_id = state.auth_service.validate_token(token).map_err(|e| {
            debug!("Rejected token: {}", e);
            ApiError::from(e)
        })?;

        Ok(AuthUser { user_id })
    }
}
