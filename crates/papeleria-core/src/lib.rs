//! Papelería Core Library
//!
//! Inventory cache, storage port, validation and export for the
//! Papelería inventory service.

// Re-export pure types from papeleria-types
pub use papeleria_types::*;

pub mod error;
pub mod export;
pub mod inventory;
pub mod memory_store;
pub mod ports;
pub mod validation;

pub use error::{InventoryError, Result};
pub use export::ExportFormat;
pub use inventory::Inventory;
pub use memory_store::MemoryProductStore;
pub use ports::ProductStore;
pub use validation::FieldValue;
