//! Server configuration
//!
//! Defaults, then an optional `papeleria.{toml,yaml,json}` in the working
//! directory, then `PAPELERIA_*` environment variables.

use crate::services::MAX_TOKEN_TTL_HOURS;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, warn};

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub data_dir: PathBuf,
    /// Defaults to `<data_dir>/papeleria.db`
    pub database_path: Option<String>,
    /// Defaults to `<data_dir>/exports`
    pub export_dir: Option<PathBuf>,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        info!("Loading configuration...");

        let settings = ::config::Config::builder()
            .set_default("bind_address", "0.0.0.0:5000")?
            .set_default("data_dir", "./data")?
            .set_default("jwt_secret", DEFAULT_JWT_SECRET)?
            .set_default("token_ttl_hours", 24)?
            .add_source(::config::File::with_name("papeleria").required(false))
            .add_source(::config::Environment::with_prefix("PAPELERIA").try_parsing(true))
            .build()
            .context("Failed to read configuration sources")?;

        let config: ServerConfig = settings
            .try_deserialize()
            .context("Invalid configuration")?;

        if config.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("PAPELERIA_JWT_SECRET not set, using default (insecure for production)");
        }
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&self.token_ttl_hours) {
            anyhow::bail!(
                "token_ttl_hours must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_HOURS,
                self.token_ttl_hours
            );
        }
        Ok(())
    }

    pub fn database_path(&self) -> String {
        self.database_path.clone().unwrap_or_else(|| {
            self.data_dir
                .join("papeleria.db")
                .to_string_lossy()
                .to_string()
        })
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("exports"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ServerConfig {
        ServerConfig {
            bind_address: "127.0.0.1:5000".to_string(),
            data_dir: PathBuf::from("/var/lib/papeleria"),
            database_path: None,
            export_dir: None,
            jwt_secret: "secret".to_string(),
            token_ttl_hours: 24,
        }
    }

    #[test]
    fn test_derived_paths() {
        let config = base();
        assert_eq!(config.database_path(), "/var/lib/papeleria/papeleria.db");
        assert_eq!(
            config.export_dir(),
            PathBuf::from("/var/lib/papeleria/exports")
        );
    }

    #[test]
    fn test_token_ttl_bounds() {
        assert!(base().validate().is_ok());
        for hours in [0, -5, MAX_TOKEN_TTL_HOURS + 1, i64::MAX] {
            let config = ServerConfig {
                token_ttl_hours: hours,
                ..base()
            };
            assert!(config.validate().is_err(), "accepted {} hours", hours);
        }
    }

    #[test]
    fn test_explicit_paths_win() {
        let config = ServerConfig {
            database_path: Some("/tmp/inventario.db".to_string()),
            export_dir: Some(PathBuf::from("/srv/exports")),
            ..base()
        };
        assert_eq!(config.database_path(), "/tmp/inventario.db");
        assert_eq!(config.export_dir(), PathBuf::from("/srv/exports"));
    }
}
