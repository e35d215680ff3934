//! SQLite database layer (embedded, no external dependencies)

use anyhow::{Context, Result};
use async_trait::async_trait;
use papeleria_core::{InventoryError, ProductStore};
use papeleria_types::{Customer, CustomerDraft, NewProduct, Product, User};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;

pub struct Database {
    pool: Arc<SqlitePool>,
}

impl Database {
    pub async fn new(database_path: &str) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", database_path);

        // Create parent directory if needed
        if let Some(parent) = std::path::Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                tracing::info!("Creating parent directory: {}", parent.display());
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", database_path)
            })?;

        Self::with_pool(pool).await
    }

    /// Private in-memory database. A single connection keeps every query on the same database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory SQLite database")?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        tracing::info!("SQLite connection established, running migrations...");

        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        tracing::info!("Database initialization complete");

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        // Products table. Prices are kept as decimal text to stay exact.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS productos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nombre TEXT NOT NULL UNIQUE COLLATE NOCASE,
                cantidad INTEGER NOT NULL DEFAULT 0 CHECK (cantidad >= 0),
                precio TEXT NOT NULL DEFAULT '0.00'
            )
            "#,
        )
        .execute(pool)
        .await?;

        // Customers table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clientes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nombre TEXT NOT NULL,
                apellido TEXT NOT NULL,
                telefono TEXT NOT NULL,
                email TEXT UNIQUE,
                fecha_registro DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(pool)
        .await?;

        // Users table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS usuarios (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nombre TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&*self.pool).await?;
        Ok(())
    }

    // Customer operations
    pub async fn list_customers(&self) -> Result<Vec<Customer>> {
        let rows: Vec<CustomerRow> = sqlx::query_as(
            r#"
            SELECT id, nombre, apellido, telefono, email, fecha_registro
            FROM clientes ORDER BY id DESC
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    pub async fn get_customer(&self, id: i64) -> Result<Option<Customer>> {
        let row: Option<CustomerRow> = sqlx::query_as(
            r#"
            SELECT id, nombre, apellido, telefono, email, fecha_registro
            FROM clientes WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    /// Id of a customer using `email`, ignoring customer `excluding`
    pub async fn find_customer_by_email(
        &self,
        email: &str,
        excluding: Option<i64>,
    ) -> Result<Option<i64>> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT id FROM clientes WHERE email = ?1 AND id != ?2
            "#,
        )
        .bind(email)
        .bind(excluding.unwrap_or(-1))
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|(id,)| id))
    }

    pub async fn create_customer(&self, draft: &CustomerDraft) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO clientes (nombre, apellido, telefono, email)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(&draft.phone)
        .bind(&draft.email)
        .execute(&*self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update_customer(&self, id: i64, draft: &CustomerDraft) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE clientes SET nombre = ?1, apellido = ?2, telefono = ?3, email = ?4
            WHERE id = ?5
            "#,
        )
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(&draft.phone)
        .bind(&draft.email)
        .bind(id)
        .execute(&*self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_customer(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM clientes WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(&*self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // User operations
    pub async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO usuarios (nombre, email, password)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .execute(&*self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// User and password hash for `email`
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<(User, String)>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, nombre, email, password FROM usuarios WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|r| r.into_user_and_hash()))
    }

    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, nombre, email, password FROM usuarios WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|r| r.into_user_and_hash().0))
    }
}

fn storage_error(e: sqlx::Error) -> InventoryError {
    InventoryError::Storage(e.to_string())
}

#[async_trait]
impl ProductStore for Database {
    async fn fetch_all(&self) -> papeleria_core::Result<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, nombre, cantidad, precio FROM productos
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(storage_error)?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn insert(&self, product: &NewProduct) -> papeleria_core::Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO productos (nombre, cantidad, precio)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(&product.name)
        .bind(product.quantity)
        .bind(product.price.to_string())
        .execute(&*self.pool)
        .await
        .map_err(storage_error)?;

        Ok(result.last_insert_rowid())
    }

    async fn update(&self, product: &Product) -> papeleria_core::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE productos SET nombre = ?1, cantidad = ?2, precio = ?3
            WHERE id = ?4
            "#,
        )
        .bind(&product.name)
        .bind(product.quantity)
        .bind(product.price.to_string())
        .bind(product.id)
        .execute(&*self.pool)
        .await
        .map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> papeleria_core::Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM productos WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(&*self.pool)
        .await
        .map_err(storage_error)?;

        Ok(result.rows_affected())
    }

    async fn fetch_one(&self, id: i64) -> papeleria_core::Result<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, nombre, cantidad, precio FROM productos WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(storage_error)?;

        row.map(Product::try_from).transpose()
    }
}

// Helper structs for sqlx query_as
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    nombre: String,
    cantidad: i64,
    precio: String,
}

impl TryFrom<ProductRow> for Product {
    type Error = InventoryError;

    fn try_from(r: ProductRow) -> Result<Self, Self::Error> {
        let price = Decimal::from_str(&r.precio).map_err(|e| {
            InventoryError::Storage(format!(
                "product {} has an unreadable price '{}': {}",
                r.id, r.precio, e
            ))
        })?;

        Ok(Product {
            id: r.id,
            name: r.nombre,
            quantity: r.cantidad,
            price,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    nombre: String,
    apellido: String,
    telefono: String,
    email: Option<String>,
    fecha_registro: chrono::DateTime<chrono::Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(r: CustomerRow) -> Self {
        Customer {
            id: r.id,
            first_name: r.nombre,
            last_name: r.apellido,
            phone: r.telefono,
            email: r.email,
            registered_at: r.fecha_registro,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    nombre: String,
    email: String,
    password: String,
}

impl UserRow {
    fn into_user_and_hash(self) -> (User, String) {
        (
            User {
                id: self.id,
                name: self.nombre,
                email: self.email,
            },
            self.password,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use papeleria_core::Inventory;
    use tokio_test::assert_ok;

    fn new_product(name: &str, quantity: i64, cents: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            quantity,
            price: Decimal::new(cents, 2),
        }
    }

    #[tokio::test]
    async fn test_product_store_roundtrip() {
        let db = Database::in_memory().await.unwrap();

        let id = assert_ok!(db.insert(&new_product("Cuaderno", 10, 150)).await);
        let stored = assert_ok!(db.fetch_one(id).await).unwrap();
        assert_eq!(stored.name, "Cuaderno");
        assert_eq!(stored.price.to_string(), "1.50");

        let mut changed = stored.clone();
        changed.quantity = 7;
        assert!(db.update(&changed).await.unwrap());
        assert_eq!(db.fetch_one(id).await.unwrap().unwrap().quantity, 7);

        assert_eq!(db.delete(id).await.unwrap(), 1);
        assert_eq!(db.delete(id).await.unwrap(), 0);
        assert!(db.fetch_one(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let db = Database::in_memory().await.unwrap();
        let first = db.insert(&new_product("Cuaderno", 10, 150)).await.unwrap();
        db.delete(first).await.unwrap();
        let second = db.insert(&new_product("Cuaderno", 3, 100)).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_unique_constraint_is_storage_error() {
        let db = Database::in_memory().await.unwrap();
        db.insert(&new_product("Regla", 1, 80)).await.unwrap();
        let err = db.insert(&new_product("Regla", 2, 90)).await.unwrap_err();
        assert!(matches!(err, InventoryError::Storage(_)));

        let err = db.insert(&new_product("REGLA", 2, 90)).await.unwrap_err();
        assert!(matches!(err, InventoryError::Storage(_)));
        assert_eq!(db.fetch_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_inventory_over_sqlite() {
        let db = Arc::new(Database::in_memory().await.unwrap());
        db.insert(&new_product("Lápiz", 30, 35)).await.unwrap();

        let inventory = Inventory::load_all(db.clone()).await.unwrap();
        assert_eq!(inventory.len().await, 1);

        let added = inventory
            .add("Cuaderno", 10, Decimal::new(150, 2))
            .await
            .unwrap();
        assert!(matches!(
            inventory.add("CUADERNO", 1, Decimal::ONE).await,
            Err(InventoryError::DuplicateName(_))
        ));

        let reloaded = Inventory::load_all(db.clone()).await.unwrap();
        assert_eq!(reloaded.list_all().await, inventory.list_all().await);
        assert_eq!(reloaded.get(added.id).await, Some(added));
    }

    #[tokio::test]
    async fn test_customer_queries() {
        let db = Database::in_memory().await.unwrap();
        let draft = CustomerDraft {
            first_name: "Ana".to_string(),
            last_name: "Torres".to_string(),
            phone: "0991234567".to_string(),
            email: Some("ana@example.com".to_string()),
        };

        let id = db.create_customer(&draft).await.unwrap();
        let customer = db.get_customer(id).await.unwrap().unwrap();
        assert_eq!(customer.first_name, "Ana");
        assert_eq!(customer.email.as_deref(), Some("ana@example.com"));

        assert_eq!(
            db.find_customer_by_email("ana@example.com", None).await.unwrap(),
            Some(id)
        );
        assert_eq!(
            db.find_customer_by_email("ana@example.com", Some(id)).await.unwrap(),
            None
        );

        let second = db
            .create_customer(&CustomerDraft {
                email: None,
                ..draft.clone()
            })
            .await
            .unwrap();
        let listed: Vec<i64> = db.list_customers().await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(listed, vec![second, id]);

        assert!(db.delete_customer(id).await.unwrap());
        assert!(!db.delete_customer(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_user_queries() {
        let db = Database::in_memory().await.unwrap();
        let id = db
            .create_user("Admin", "admin@papeleria.ec", "$argon2id$stub")
            .await
            .unwrap();

        let (user, hash) = db.get_user_by_email("admin@papeleria.ec").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(hash, "$argon2id$stub");
        assert_eq!(db.get_user_by_id(id).await.unwrap().unwrap().name, "Admin");
        assert!(db.get_user_by_email("nadie@papeleria.ec").await.unwrap().is_none());
    }
}
