//! Customer management service
//!
//! Customers are not cached; every call goes straight to the database.

use crate::storage::Database;
use papeleria_types::{Customer, CustomerDraft, MAX_NAME_LEN, MAX_PHONE_LEN};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum CustomerError {
    #[error("Invalid customer: {0}")]
    Invalid(String),

    #[error("A customer with email '{0}' already exists")]
    EmailTaken(String),

    #[error("Customer not found: {0}")]
    NotFound(i64),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CustomerError>;

pub struct CustomerService {
    db: Arc<Database>,
}

impl CustomerService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Newest first
    pub async fn list(&self) -> Result<Vec<Customer>> {
        Ok(self.db.list_customers().await?)
    }

    pub async fn get(&self, id: i64) -> Result<Customer> {
        self.db
            .get_customer(id)
            .await?
            .ok_or(CustomerError::NotFound(id))
    }

    pub async fn create(&self, draft: CustomerDraft) -> Result<Customer> {
        let draft = normalize(draft)?;
        if let Some(email) = &draft.email {
            if self.db.find_customer_by_email(email, None).await?.is_some() {
                return Err(CustomerError::EmailTaken(email.clone()));
            }
        }

        let id = self.db.create_customer(&draft).await?;
        info!("Created customer {} {} {}", id, draft.first_name, draft.last_name);
        self.get(id).await
    }

    pub async fn update(&self, id: i64, draft: CustomerDraft) -> Result<Customer> {
        let draft = normalize(draft)?;
        if let Some(email) = &draft.email {
            if self.db.find_customer_by_email(email, Some(id)).await?.is_some() {
                return Err(CustomerError::EmailTaken(email.clone()));
            }
        }

        if !self.db.update_customer(id, &draft).await? {
            return Err(CustomerError::NotFound(id));
        }
        info!("Updated customer {}", id);
        self.get(id).await
    }

    /// Returns false when no customer had this id
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let deleted = self.db.delete_customer(id).await?;
        if deleted {
            info!("Deleted customer {}", id);
        }
        Ok(deleted)
    }
}

fn required(field: &str, value: &str, max: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CustomerError::Invalid(format!("{} is required", field)));
    }
    if value.chars().count() > max {
        return Err(CustomerError::Invalid(format!(
            "{} is longer than {} characters",
            field, max
        )));
    }
    Ok(value.to_string())
}

fn normalize(draft: CustomerDraft) -> Result<CustomerDraft> {
    let email = match draft.email.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(email) => {
            if !email.contains('@') {
                return Err(CustomerError::Invalid(format!("invalid email '{}'", email)));
            }
            Some(required("email", email, MAX_NAME_LEN)?)
        }
    };

    Ok(CustomerDraft {
        first_name: required("first_name", &draft.first_name, MAX_NAME_LEN)?,
        last_name: required("last_name", &draft.last_name, MAX_NAME_LEN)?,
        phone: required("phone", &draft.phone, MAX_PHONE_LEN)?,
        email,
    })
}
