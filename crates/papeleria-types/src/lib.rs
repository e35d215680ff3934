//! Papelería Types - Pure type definitions
//!
//! This crate contains only plain data types shared by the inventory core
//! and the HTTP server. No async runtime, no storage.

pub mod customer;
pub mod product;
pub mod user;

pub use customer::*;
pub use product::*;
pub use user::*;

/// Maximum length (in characters) of product, customer and user names.
pub const MAX_NAME_LEN: usize = 120;

/// Maximum length (in characters) of a customer phone number.
pub const MAX_PHONE_LEN: usize = 20;
