//! Field validation and conversion at the request boundary

use crate::error::{InventoryError, Result};
use papeleria_types::MAX_NAME_LEN;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Fractional digits kept for prices
pub const PRICE_SCALE: u32 = 2;

/// A numeric form field as it arrives: a JSON number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    /// Convert to a non-negative whole quantity
    pub fn to_quantity(&self) -> Result<i64> {
        let quantity = match self {
            FieldValue::Number(n) => n.as_i64().ok_or_else(|| {
                InventoryError::InvalidValue(format!("quantity must be a whole number, got {}", n))
            })?,
            FieldValue::Text(s) => s.trim().parse::<i64>().map_err(|_| {
                InventoryError::InvalidValue(format!("quantity must be a whole number, got '{}'", s))
            })?,
        };
        validate_quantity(quantity)
    }

    /// Convert to a non-negative price with two fractional digits
    pub fn to_price(&self) -> Result<Decimal> {
        let raw = match self {
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.trim().to_string(),
        };
        let price = parse_decimal(&raw).ok_or_else(|| {
            InventoryError::InvalidValue(format!("price must be a number, got '{}'", raw))
        })?;
        validate_price(price)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Number(v.into())
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

pub fn validate_quantity(quantity: i64) -> Result<i64> {
    if quantity < 0 {
        return Err(InventoryError::InvalidValue(format!(
            "quantity cannot be negative, got {}",
            quantity
        )));
    }
    Ok(quantity)
}

/// Reject negative prices and round to [`PRICE_SCALE`] digits
pub fn validate_price(price: Decimal) -> Result<Decimal> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(InventoryError::InvalidValue(format!(
            "price cannot be negative, got {}",
            price
        )));
    }
    let mut rounded = price
        .abs()
        .round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(PRICE_SCALE);
    Ok(rounded)
}

/// Trim a product name and enforce 1..=MAX_NAME_LEN characters
pub fn normalize_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(InventoryError::InvalidValue("name is required".to_string()));
    }
    let len = trimmed.chars().count();
    if len > MAX_NAME_LEN {
        return Err(InventoryError::InvalidValue(format!(
            "name is {} characters long, maximum is {}",
            len, MAX_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_from_number_and_text() {
        assert_eq!(FieldValue::from(10).to_quantity(), Ok(10));
        assert_eq!(FieldValue::from(" 7 ").to_quantity(), Ok(7));
        assert_eq!(FieldValue::from(0).to_quantity(), Ok(0));
    }

    #[test]
    fn test_quantity_rejects_negative_and_garbage() {
        assert!(matches!(
            FieldValue::from(-1).to_quantity(),
            Err(InventoryError::InvalidValue(_))
        ));
        assert!(matches!(
            FieldValue::from("diez").to_quantity(),
            Err(InventoryError::InvalidValue(_))
        ));
        let fractional: FieldValue = serde_json::from_str("2.5").unwrap();
        assert!(matches!(
            fractional.to_quantity(),
            Err(InventoryError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_price_parsing_rounds_to_cents() {
        let from_json: FieldValue = serde_json::from_str("1.5").unwrap();
        let price = from_json.to_price().unwrap();
        assert_eq!(price, Decimal::new(150, 2));
        assert_eq!(price.to_string(), "1.50");

        assert_eq!(
            FieldValue::from("2.345").to_price().unwrap(),
            Decimal::new(235, 2)
        );
        assert_eq!(FieldValue::from("3").to_price().unwrap().to_string(), "3.00");
    }

    #[test]
    fn test_price_rejects_negative_and_garbage() {
        assert!(matches!(
            FieldValue::from("-0.01").to_price(),
            Err(InventoryError::InvalidValue(_))
        ));
        assert!(matches!(
            FieldValue::from("").to_price(),
            Err(InventoryError::InvalidValue(_))
        ));
        assert!(matches!(
            FieldValue::from("uno").to_price(),
            Err(InventoryError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_untagged_deserialization() {
        let text: FieldValue = serde_json::from_str("\"12\"").unwrap();
        assert_eq!(text, FieldValue::Text("12".to_string()));
        let number: FieldValue = serde_json::from_str("12").unwrap();
        assert_eq!(number, FieldValue::from(12));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Cuaderno  ").unwrap(), "Cuaderno");
        assert!(normalize_name("   ").is_err());
        assert!(normalize_name(&"a".repeat(MAX_NAME_LEN)).is_ok());
        assert!(normalize_name(&"ñ".repeat(MAX_NAME_LEN + 1)).is_err());
    }
}
