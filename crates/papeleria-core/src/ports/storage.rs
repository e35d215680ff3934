//! Storage traits for persistence

use crate::Result;
use async_trait::async_trait;
use papeleria_types::{NewProduct, Product};

/// Product store
///
/// The authoritative product table. Implementations report connection and
/// query failures as [`crate::InventoryError::Storage`].
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Product>>;
    /// Insert a row and return the id the store generated for it.
    async fn insert(&self, product: &NewProduct) -> Result<i64>;
    /// Overwrite name, quantity and price of `product.id`. Returns false if no row matched.
    async fn update(&self, product: &Product) -> Result<bool>;
    /// Returns the number of rows deleted.
    async fn delete(&self, id: i64) -> Result<u64>;
    async fn fetch_one(&self, id: i64) -> Result<Option<Product>>;
}
