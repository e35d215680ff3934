//! Flat-file export of the product list
//!
//! All formats emit the same fields (id, name, quantity, price) in the order
//! they are given, which callers take from [`crate::Inventory::list_all`].
//! Prices are plain numbers in every format.

use crate::error::{InventoryError, Result};
use papeleria_types::Product;
use serde::Serialize;
use std::fmt::Write as _;
use std::str::FromStr;

/// Base name of exported files
pub const EXPORT_FILE_STEM: &str = "productos";

const CSV_HEADER: &str = "id,name,quantity,price";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Txt,
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "text/plain; charset=utf-8",
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", EXPORT_FILE_STEM, self.extension())
    }

    pub fn render(&self, products: &[Product]) -> Result<String> {
        match self {
            ExportFormat::Txt => Ok(to_txt(products)),
            ExportFormat::Json => to_json(products),
            ExportFormat::Csv => Ok(to_csv(products)),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" => Ok(ExportFormat::Txt),
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(InventoryError::InvalidValue(format!(
                "unknown export format '{}', expected txt, json or csv",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// `id, name, quantity, price` per line
pub fn to_txt(products: &[Product]) -> String {
    let mut out = String::new();
    for p in products {
        let _ = writeln!(out, "{}, {}, {}, {:.2}", p.id, p.name, p.quantity, p.price);
    }
    out
}

/// Pretty-printed JSON array, four-space indent
pub fn to_json(products: &[Product]) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    products.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|e| InventoryError::InvalidValue(e.to_string()))
}

pub fn to_csv(products: &[Product]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push_str("\r\n");
    for p in products {
        let _ = write!(
            out,
            "{},{},{},{:.2}\r\n",
            p.id,
            csv_field(&p.name),
            p.quantity,
            p.price
        );
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains(|c| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
