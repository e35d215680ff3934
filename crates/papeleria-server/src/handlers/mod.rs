//! HTTP handlers

pub mod auth;
pub mod customers;
pub mod error;
pub mod export;
pub mod health;
pub mod products;

pub use error::ApiError;
pub use health::health;
