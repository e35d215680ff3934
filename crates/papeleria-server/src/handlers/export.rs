//! Inventory export
//!
//! Renders the full product list, saves a copy under the export directory and
//! returns it as a download.

use crate::extractors::AuthUser;
use crate::handlers::ApiError;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use papeleria_core::ExportFormat;
use tracing::{error, info};

pub async fn export(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(format): Path<String>,
) -> Result<Response, ApiError> {
    let format: ExportFormat = format.parse()?;
    let products = state.inventory.list_all().await;
    let body = format.render(&products)?;

    let path = state.export_dir.join(format.file_name());
    tokio::fs::create_dir_all(state.export_dir.as_path())
        .await
        .map_err(|e| {
            error!("Failed to create export directory {}: {}", state.export_dir.display(), e);
            ApiError::internal("Failed to write export file")
        })?;
    tokio::fs::write(&path, body.as_bytes()).await.map_err(|e| {
        error!("Failed to write {}: {}", path.display(), e);
        ApiError::internal("Failed to write export file")
    })?;
    info!("Exported {} products to {}", products.len(), path.display());

    let disposition = format!("attachment; filename=\"{}\"", format.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
