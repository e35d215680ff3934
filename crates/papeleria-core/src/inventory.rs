//! In-memory inventory cache
//!
//! Mirrors the product table and keeps a count of lower-cased names so that
//! uniqueness checks never hit the database. Every mutation writes through to
//! the [`ProductStore`] first and only touches memory once the store call
//! succeeded, so a storage failure leaves the cache exactly as it was.
//!
//! The mirror sits behind one [`RwLock`]. `add`, `update` and `delete` hold
//! the write guard across check, store write and mirror update; reads take
//! the read guard and never see a half-applied mutation.

use crate::error::{InventoryError, Result};
use crate::ports::ProductStore;
use crate::validation::{normalize_name, validate_price, validate_quantity};
use papeleria_types::{NewProduct, Product, ProductPatch};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub struct Inventory {
    store: Arc<dyn ProductStore>,
    state: RwLock<InventoryState>,
}

#[derive(Default)]
struct InventoryState {
    products: HashMap<i64, Product>,
    /// Lower-cased name of every product in `products`, with the number of
    /// cached products using it. Rows loaded from a store that tolerates case
    /// variants can share a key; it stays reserved until the last one leaves.
    names: HashMap<String, usize>,
}

impl InventoryState {
    fn from_products(products: Vec<Product>) -> Self {
        let mut state = Self::default();
        for product in products {
            if state.names.contains_key(&product.name_key()) {
                warn!(
                    "Product {} '{}' collides case-insensitively with another stored product",
                    product.id, product.name
                );
            }
            state.register(product);
        }
        state
    }

    fn register(&mut self, product: Product) {
        if let Some(previous) = self.products.remove(&product.id) {
            self.release(&previous.name_key());
        }
        *self.names.entry(product.name_key()).or_insert(0) += 1;
        self.products.insert(product.id, product);
    }

    fn forget(&mut self, id: i64) {
        if let Some(previous) = self.products.remove(&id) {
            self.release(&previous.name_key());
        }
    }

    fn release(&mut self, key: &str) {
        if let Some(count) = self.names.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                self.names.remove(key);
            }
        }
    }

    fn is_taken(&self, key: &str) -> bool {
        self.names.contains_key(key)
    }

    fn sorted<'a>(products: impl Iterator<Item = &'a Product>) -> Vec<Product> {
        let mut products: Vec<Product> = products.cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        products
    }
}

impl Inventory {
    /// Build the cache from every row currently in the store
    pub async fn load_all(store: Arc<dyn ProductStore>) -> Result<Self> {
        let products = store.fetch_all().await?;
        info!("Loaded {} products into inventory cache", products.len());

        Ok(Self {
            store,
            state: RwLock::new(InventoryState::from_products(products)),
        })
    }

    /// Create a product. The store assigns the id.
    pub async fn add(&self, name: &str, quantity: i64, price: Decimal) -> Result<Product> {
        let name = normalize_name(name)?;
        let new = NewProduct {
            quantity: validate_quantity(quantity)?,
            price: validate_price(price)?,
            name,
        };

        let mut state = self.state.write().await;
        if state.is_taken(&new.name.to_lowercase()) {
            debug!("Rejecting duplicate product name '{}'", new.name);
            return Err(InventoryError::DuplicateName(new.name));
        }

        let id = self.store.insert(&new).await?;
        let product = Product::from_new(id, new);
        state.register(product.clone());

        info!("Added product {} '{}'", product.id, product.name);
        Ok(product)
    }

    /// Apply the supplied fields of `patch` to product `id`.
    ///
    /// Falls back to the store when `id` is not cached. Renaming a product to
    /// a case variant of its own name is not a collision.
    pub async fn update(&self, id: i64, patch: ProductPatch) -> Result<Product> {
        let patch = ProductPatch {
            name: patch.name.as_deref().map(normalize_name).transpose()?,
            quantity: patch.quantity.map(validate_quantity).transpose()?,
            price: patch.price.map(validate_price).transpose()?,
        };

        let mut state = self.state.write().await;
        let current = match state.products.get(&id) {
            Some(product) => product.clone(),
            None => {
                debug!("Product {} not cached, looking it up in the store", id);
                self.store
                    .fetch_one(id)
                    .await?
                    .ok_or(InventoryError::NotFound(id))?
            }
        };

        if let Some(name) = &patch.name {
            let key = name.to_lowercase();
            if key != current.name_key() && state.is_taken(&key) {
                return Err(InventoryError::DuplicateName(name.clone()));
            }
        }

        if patch.is_empty() {
            debug!("Empty patch for product {}, nothing to write", id);
            return Ok(current);
        }

        let mut updated = current.clone();
        updated.apply(patch);

        if !self.store.update(&updated).await? {
            warn!("Product {} vanished from the store, dropping it from the cache", id);
            state.forget(id);
            return Err(InventoryError::NotFound(id));
        }

        state.register(updated.clone());

        info!("Updated product {} '{}'", updated.id, updated.name);
        Ok(updated)
    }

    /// Delete product `id`. Returns false if it exists neither in memory nor in the store.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        let product = match state.products.get(&id) {
            Some(product) => product.clone(),
            None => match self.store.fetch_one(id).await? {
                Some(product) => product,
                None => return Ok(false),
            },
        };

        let affected = self.store.delete(id).await?;
        state.forget(id);

        if affected == 0 {
            warn!("Product {} was cached but already gone from the store", id);
            return Ok(false);
        }

        info!("Deleted product {} '{}'", product.id, product.name);
        Ok(true)
    }

    /// Case-insensitive substring search over cached names, sorted by name.
    ///
    /// A blank query matches every product.
    pub async fn find_by_name_substring(&self, query: &str) -> Vec<Product> {
        let query = query.trim().to_lowercase();
        let state = self.state.read().await;
        InventoryState::sorted(
            state
                .products
                .values()
                .filter(|p| p.name_key().contains(&query)),
        )
    }

    /// Every cached product, sorted by name
    pub async fn list_all(&self) -> Vec<Product> {
        let state = self.state.read().await;
        InventoryState::sorted(state.products.values())
    }

    pub async fn get(&self, id: i64) -> Option<Product> {
        self.state.read().await.products.get(&id).cloned()
    }

    /// Whether a product with this name (any case) is cached
    pub async fn contains_name(&self, name: &str) -> bool {
        self.state
            .read()
            .await
            .is_taken(&name.trim().to_lowercase())
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.products.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
