//! Error types for the inventory

use thiserror::Error;

pub type Result<T> = std::result::Result<T, InventoryError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// Another product already uses this name (case-insensitive)
    #[error("A product named '{0}' already exists")]
    DuplicateName(String),

    /// Non-numeric, negative or otherwise unacceptable field value
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Product not found: {0}")]
    NotFound(i64),

    /// The persistent store could not complete the call
    #[error("Storage error: {0}")]
    Storage(String),
}

impl InventoryError {
    /// Duplicate, invalid and not-found errors are user feedback, not failures
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, InventoryError::Storage(_))
    }

    /// Stable machine-readable kind used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            InventoryError::DuplicateName(_) => "duplicate_name",
            InventoryError::InvalidValue(_) => "invalid_value",
            InventoryError::NotFound(_) => "not_found",
            InventoryError::Storage(_) => "storage_unavailable",
        }
    }
}

impl From<serde_json::Error> for InventoryError {
    fn from(e: serde_json::Error) -> Self {
        InventoryError::InvalidValue(e.to_string())
    }
}
