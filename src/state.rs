//! Application state management

use crate::config::{AppConfig, MarketBackend};
use crate::db::duckdb::DuckDb;
use crate::db::sqlite::SqliteDb;
use crate::db::MarketStore;
use crate::error::Result;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Embedded SQLite store; always present, owns the portfolio
    pub portfolio: Arc<SqliteDb>,

    /// Whichever backend serves market data
    pub market: Arc<dyn MarketStore>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: AppConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        tracing::info!("Data directory: {:?}", config.data_dir);

        let sqlite_path = config.data_dir.join("stockdash.db");
        let portfolio = Arc::new(SqliteDb::new(&sqlite_path)?);

        let market: Arc<dyn MarketStore> = match config.market_backend {
            MarketBackend::Sqlite => {
                tracing::info!("Market backend: embedded SQLite");
                portfolio.clone()
            }
            MarketBackend::DuckDb => {
                let duckdb_path = config.data_dir.join("warehouse.duckdb");
                tracing::info!("Market backend: DuckDB warehouse at {:?}", duckdb_path);
                Arc::new(DuckDb::new(
                    &duckdb_path,
                    config.warehouse_schema.clone(),
                )?)
            }
        };

        Ok(Self {
            config,
            portfolio,
            market,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config(dir: &std::path::Path, backend: MarketBackend) -> AppConfig {
        AppConfig {
            data_dir: dir.to_path_buf(),
            host: "127.0.0.1".to_string(),
            port: 0,
            market_backend: backend,
            warehouse_schema: None,
        }
    }

    #[test]
    fn sqlite_backend_shares_the_portfolio_store() {
        let dir = tempdir().unwrap();
        let state = AppState::new(config(dir.path(), MarketBackend::Sqlite)).unwrap();

        state.portfolio.upsert_holding("AAPL", 1.0).unwrap();
        // Market queries hit the same file without error
        assert!(state.market.list_tickers().unwrap().is_empty());
    }

    #[test]
    fn duckdb_backend_creates_the_warehouse_file() {
        let dir = tempdir().unwrap();
        let state = AppState::new(config(dir.path(), MarketBackend::DuckDb)).unwrap();

        assert!(dir.path().join("warehouse.duckdb").exists());
        assert!(state.market.list_tickers().unwrap().is_empty());
    }
}
