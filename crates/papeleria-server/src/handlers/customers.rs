//! Customer handlers

use crate::extractors::AuthUser;
use crate::handlers::ApiError;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use papeleria_types::{Customer, CustomerDraft};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CustomerListResponse {
    customers: Vec<Customer>,
}

pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<CustomerListResponse>, ApiError> {
    let customers = state.customers.list().await?;
    Ok(Json(CustomerListResponse { customers }))
}

pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(draft): Json<CustomerDraft>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let customer = state.customers.create(draft).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Customer>, ApiError> {
    Ok(Json(state.customers.get(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
    Json(draft): Json<CustomerDraft>,
) -> Result<Json<Customer>, ApiError> {
    Ok(Json(state.customers.update(id, draft).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.customers.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Customer not found: {}", id)))
    }
}
