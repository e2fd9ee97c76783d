//! Application configuration
//!
//! Read once from the environment at startup. Every value has a default
//! suitable for running locally against the embedded store.

use crate::error::{AppError, Result};
use std::env;
use std::path::PathBuf;

/// Which storage backend serves market data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketBackend {
    /// Embedded SQLite file (local mode)
    Sqlite,
    /// DuckDB analytical store (warehouse mode)
    DuckDb,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the database files
    pub data_dir: PathBuf,
    /// HTTP bind host
    pub host: String,
    /// HTTP bind port
    pub port: u16,
    /// Backend serving market data (portfolio always lives in SQLite)
    pub market_backend: MarketBackend,
    /// Optional schema qualifier for warehouse tables (the dataset namespace)
    pub warehouse_schema: Option<String>,
}

impl AppConfig {
    /// Load configuration from the environment
    pub fn from_env() -> Result<Self> {
        let data_dir = env::var("STOCKDASH_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let host = env::var("STOCKDASH_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = match env::var("STOCKDASH_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| AppError::Config(format!("Invalid STOCKDASH_PORT: {}", raw)))?,
            Err(_) => 8050,
        };

        let market_backend = match env::var("STOCKDASH_BACKEND") {
            Ok(raw) => match raw.as_str() {
                "sqlite" => MarketBackend::Sqlite,
                "duckdb" => MarketBackend::DuckDb,
                other => {
                    return Err(AppError::Config(format!(
                        "Unknown STOCKDASH_BACKEND: {} (expected 'sqlite' or 'duckdb')",
                        other
                    )))
                }
            },
            Err(_) => MarketBackend::Sqlite,
        };

        let warehouse_schema = env::var("STOCKDASH_WAREHOUSE_SCHEMA").ok();

        Ok(Self {
            data_dir,
            host,
            port,
            market_backend,
            warehouse_schema,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        // Relies on the test environment not setting STOCKDASH_* vars
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8050);
        assert_eq!(config.market_backend, MarketBackend::Sqlite);
        assert!(config.warehouse_schema.is_none());
    }
}
