//! Product handlers
//!
//! Each handler performs a single inventory operation.

use crate::extractors::AuthUser;
use crate::handlers::ApiError;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use papeleria_core::{FieldValue, Product, ProductPatch};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    products: Vec<Product>,
}

/// Quantity and price may arrive as JSON numbers or as form-style strings
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    name: String,
    quantity: FieldValue,
    price: FieldValue,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    name: Option<String>,
    quantity: Option<FieldValue>,
    price: Option<FieldValue>,
}

impl UpdateProductRequest {
    fn into_patch(self) -> Result<ProductPatch, ApiError> {
        Ok(ProductPatch {
            name: self.name,
            quantity: self.quantity.as_ref().map(FieldValue::to_quantity).transpose()?,
            price: self.price.as_ref().map(FieldValue::to_price).transpose()?,
        })
    }
}

pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<SearchParams>,
) -> Json<ProductListResponse> {
    let query = params.q.unwrap_or_default();
    let products = state.inventory.find_by_name_substring(&query).await;
    Json(ProductListResponse { products })
}

pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let quantity = req.quantity.to_quantity()?;
    let price = req.price.to_price()?;
    let product = state.inventory.add(&req.name, quantity, price).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Product>, ApiError> {
    state
        .inventory
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Product not found: {}", id)))
}

pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    let patch = req.into_patch()?;
    let product = state.inventory.update(id, patch).await?;
    Ok(Json(product))
}

pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.inventory.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Product not found: {}", id)))
    }
}
