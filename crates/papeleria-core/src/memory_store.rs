//! In-memory product store
//!
//! Behaves like the `productos` table: autoincrement ids starting at 1 and a
//! case-sensitive UNIQUE constraint on the name. Can be switched offline to
//! simulate a lost database connection.

use crate::error::{InventoryError, Result};
use crate::ports::ProductStore;
use async_trait::async_trait;
use papeleria_types::{NewProduct, Product};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

pub struct MemoryProductStore {
    rows: Mutex<BTreeMap<i64, Product>>,
    next_id: AtomicI64,
    inserts: AtomicUsize,
    available: AtomicBool,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            inserts: AtomicUsize::new(0),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the database going away (`false`) or coming back (`true`)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of successful inserts since creation
    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.rows().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn rows(&self) -> Result<MutexGuard<'_, BTreeMap<i64, Product>>> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(InventoryError::Storage(
                "connection to product store refused".to_string(),
            ));
        }
        self.rows
            .lock()
            .map_err(|e| InventoryError::Storage(format!("Failed to lock product rows: {}", e)))
    }
}

impl Default for MemoryProductStore {
    fn default() -> Self {
        Self::new()
    }
}

fn unique_violation(name: &str) -> InventoryError {
    InventoryError::Storage(format!(
        "UNIQUE constraint failed: productos.nombre ({})",
        name
    ))
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn fetch_all(&self) -> Result<Vec<Product>> {
        Ok(self.rows()?.values().cloned().collect())
    }

    async fn insert(&self, product: &NewProduct) -> Result<i64> {
        let mut rows = self.rows()?;
        if rows.values().any(|p| p.name == product.name) {
            return Err(unique_violation(&product.name));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        rows.insert(id, Product::from_new(id, product.clone()));
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    async fn update(&self, product: &Product) -> Result<bool> {
        let mut rows = self.rows()?;
        if rows
            .values()
            .any(|p| p.id != product.id && p.name == product.name)
        {
            return Err(unique_violation(&product.name));
        }

        match rows.get_mut(&product.id) {
            Some(row) => {
                *row = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> Result<u64> {
        Ok(self.rows()?.remove(&id).map(|_| 1).unwrap_or(0))
    }

    async fn fetch_one(&self, id: i64) -> Result<Option<Product>> {
        Ok(self.rows()?.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tokio_test::{assert_err, assert_ok};

    fn new_product(name: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            quantity: 1,
            price: Decimal::new(100, 2),
        }
    }

    #[tokio::test]
    async fn test_ids_autoincrement_and_are_not_reused() {
        let store = MemoryProductStore::new();
        let first = store.insert(&new_product("Regla")).await.unwrap();
        assert_eq!(first, 1);
        assert_eq!(store.delete(first).await.unwrap(), 1);

        let second = store.insert(&new_product("Regla")).await.unwrap();
        assert_eq!(second, 2);
        assert_eq!(store.insert_count(), 2);
    }

    #[tokio::test]
    async fn test_unique_name_constraint() {
        let store = MemoryProductStore::new();
        store.insert(&new_product("Borrador")).await.unwrap();
        let err = store.insert(&new_product("Borrador")).await.unwrap_err();
        assert!(matches!(err, InventoryError::Storage(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = MemoryProductStore::new();
        store.set_available(false);

        assert_err!(store.fetch_all().await);
        assert_err!(store.insert(&new_product("Tijeras")).await);
        assert_err!(store.fetch_one(1).await);
        assert_eq!(store.insert_count(), 0);

        store.set_available(true);
        assert!(assert_ok!(store.fetch_all().await).is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_row_reports_false() {
        let store = MemoryProductStore::new();
        let ghost = Product::from_new(42, new_product("Fantasma"));
        assert!(!store.update(&ghost).await.unwrap());
        assert_eq!(store.delete(42).await.unwrap(), 0);
    }
}
