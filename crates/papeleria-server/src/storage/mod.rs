//! Storage layer
//!
//! Uses SQLite (embedded). The product table is mirrored in memory by
//! [`papeleria_core::Inventory`]; customers and users are always read from disk.

pub mod db;

pub use db::Database;
