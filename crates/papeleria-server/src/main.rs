//! Papelería Server
//!
//! HTTP service for the papelería inventory: products served from the
//! in-memory inventory cache, customers, user accounts and flat-file export.
//!
//! Uses SQLite (embedded) as the backing store.

mod config;
mod extractors;
mod handlers;
mod services;
mod storage;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use papeleria_core::{Inventory, ProductStore};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::ServerConfig;
use services::{AuthService, CustomerService};
use storage::Database;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub inventory: Arc<Inventory>,
    pub customers: Arc<CustomerService>,
    pub auth_service: Arc<AuthService>,
    pub export_dir: Arc<PathBuf>,
}

impl AppState {
    /// Load the inventory cache from `db` and wire up the services
    pub async fn new(
        db: Arc<Database>,
        jwt_secret: String,
        token_ttl_hours: i64,
        export_dir: PathBuf,
    ) -> Result<Self> {
        let store: Arc<dyn ProductStore> = db.clone();
        let inventory = Inventory::load_all(store)
            .await
            .context("Failed to load inventory")?;

        Ok(Self {
            inventory: Arc::new(inventory),
            customers: Arc::new(CustomerService::new(db.clone())),
            auth_service: Arc::new(AuthService::new(db.clone(), jwt_secret, token_ttl_hours)),
            export_dir: Arc::new(export_dir),
            db,
        })
    }
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    // RUST_LOG overrides the default level
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting Papelería Server v{}", env!("CARGO_PKG_VERSION"));
    info!("PID: {}", std::process::id());

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    let config = ServerConfig::load().context("Failed to load configuration")?;
    let database_path = config.database_path();
    info!(
        "Config loaded: bind={}, db={}",
        config.bind_address, database_path
    );

    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create data directory {}",
                config.data_dir.display()
            )
        })?;

    info!("Initializing SQLite database...");
    let db = Arc::new(
        Database::new(&database_path)
            .await
            .context("Failed to initialize database")?,
    );

    info!("Loading inventory cache...");
    let state = AppState::new(
        db,
        config.jwt_secret.clone(),
        config.token_ttl_hours,
        config.export_dir(),
    )
    .await?;
    info!(
        "Inventory ready with {} products, exports go to {}",
        state.inventory.len().await,
        state.export_dir.display()
    );

    let app = router(state);

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Server ready to accept connections");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
        .route(
            "/products",
            get(handlers::products::list).post(handlers::products::create),
        )
        .route(
            "/products/:id",
            get(handlers::products::get)
                .put(handlers::products::update)
                .delete(handlers::products::delete),
        )
        .route(
            "/customers",
            get(handlers::customers::list).post(handlers::customers::create),
        )
        .route(
            "/customers/:id",
            get(handlers::customers::get)
                .put(handlers::customers::update)
                .delete(handlers::customers::delete),
        )
        .route("/export/:format", get(handlers::export::export))
}
