//! Product types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A sellable inventory item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub quantity: i64,
    /// Serialized as a plain JSON number, never as a string
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl Product {
    pub fn from_new(id: i64, new: NewProduct) -> Self {
        Self {
            id,
            name: new.name,
            quantity: new.quantity,
            price: new.price,
        }
    }

    /// Lower-cased name used for uniqueness checks
    pub fn name_key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Apply the supplied fields of a patch, leaving the others unchanged
    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
    }
}

/// A validated product that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub quantity: i64,
    pub price: Decimal,
}

/// Partial product update; `None` fields are left as they are
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<Decimal>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.quantity.is_none() && self.price.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cuaderno() -> Product {
        Product {
            id: 1,
            name: "Cuaderno".to_string(),
            quantity: 10,
            price: Decimal::new(150, 2),
        }
    }

    #[test]
    fn test_price_serializes_as_number() {
        let value = serde_json::to_value(cuaderno()).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["name"], "Cuaderno");
        assert_eq!(value["quantity"], 10);
        assert!(value["price"].is_f64());
        assert_eq!(value["price"].as_f64(), Some(1.5));
    }

    #[test]
    fn test_apply_patch_keeps_unset_fields() {
        let mut product = cuaderno();
        product.apply(ProductPatch {
            quantity: Some(7),
            ..Default::default()
        });

        assert_eq!(product.quantity, 7);
        assert_eq!(product.name, "Cuaderno");
        assert_eq!(product.price, Decimal::new(150, 2));
    }

    #[test]
    fn test_name_key_is_lowercase() {
        let mut product = cuaderno();
        product.name = "LÁPIZ Azul".to_string();
        assert_eq!(product.name_key(), "lápiz azul");
    }
}
