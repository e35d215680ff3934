//! Error responses
//!
//! Every handler failure funnels through [`ApiError`], which turns the
//! domain error kinds into a status code and a `{"error", "code"}` body.

use crate::services::{AuthError, CustomerError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use papeleria_core::InventoryError;
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "code": self.code
        }));
        (self.status, body).into_response()
    }
}

impl From<InventoryError> for ApiError {
    fn from(e: InventoryError) -> Self {
        let status = match &e {
            InventoryError::DuplicateName(_) => StatusCode::CONFLICT,
            InventoryError::InvalidValue(_) => StatusCode::UNPROCESSABLE_ENTITY,
            InventoryError::NotFound(_) => StatusCode::NOT_FOUND,
            InventoryError::Storage(_) => {
                tracing::error!("Inventory storage failure: {}", e);
                StatusCode::SERVICE_UNAVAILABLE
            }
        };
        Self::new(status, e.code(), e.to_string())
    }
}

impl From<CustomerError> for ApiError {
    fn from(e: CustomerError) -> Self {
        match e {
            CustomerError::Invalid(_) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_value", e.to_string())
            }
            CustomerError::EmailTaken(_) => {
                Self::new(StatusCode::CONFLICT, "duplicate_email", e.to_string())
            }
            CustomerError::NotFound(_) => Self::not_found(e.to_string()),
            CustomerError::Storage(inner) => {
                tracing::error!("Customer storage failure: {:#}", inner);
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "storage_unavailable",
                    "Database error",
                )
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingFields
            | AuthError::InvalidEmail
            | AuthError::NameTooLong
            | AuthError::WeakPassword
            | AuthError::PasswordMismatch => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_value", e.to_string())
            }
            AuthError::EmailTaken => Self::new(StatusCode::CONFLICT, "duplicate_email", e.to_string()),
            AuthError::InvalidCredentials | AuthError::InvalidToken(_) => {
                Self::unauthorized(e.to_string())
            }
            AuthError::Internal(inner) => {
                tracing::error!("Authentication failure: {:#}", inner);
                Self::internal("Authentication failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_error_statuses() {
        let cases = [
            (InventoryError::DuplicateName("Cuaderno".into()), StatusCode::CONFLICT),
            (InventoryError::InvalidValue("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (InventoryError::NotFound(3), StatusCode::NOT_FOUND),
            (InventoryError::Storage("down".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (error, status) in cases {
            let code = error.code();
            let api: ApiError = error.into();
            assert_eq!(api.status, status);
            assert_eq!(api.code, code);
        }
    }

    #[test]
    fn test_auth_error_statuses() {
        let api: ApiError = AuthError::InvalidCredentials.into();
        assert_eq!(api.status, StatusCode::UNAUTHORIZED);
        let api: ApiError = AuthError::EmailTaken.into();
        assert_eq!(api.status, StatusCode::CONFLICT);
    }
}
