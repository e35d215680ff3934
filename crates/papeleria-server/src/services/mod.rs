//! Business logic services

pub mod auth;
pub mod customers;

pub use auth::{AuthError, AuthService, MAX_TOKEN_TTL_HOURS};
pub use customers::{CustomerError, CustomerService};
