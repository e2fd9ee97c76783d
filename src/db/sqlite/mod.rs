//! SQLite database module
//!
//! The embedded backend. Serves market data in local mode and always owns
//! the portfolio holdings table, whichever backend serves the charts.

mod market;
mod migrations;
pub mod portfolio;

use crate::db::{CloseRow, MarketStore, OhlcRow, PriceRow, SectorRow, VolumeRow};
use crate::error::Result;
use crate::filters::{Period, VolumeBucket};
use parking_lot::Mutex;
pub use portfolio::Holding;
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::Path;

/// SQLite database wrapper
pub struct SqliteDb {
    conn: Mutex<Connection>,
}

impl SqliteDb {
    /// Create new SQLite database connection
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let db = Self {
            conn: Mutex::new(conn),
        };

        db.run_migrations()?;

        Ok(db)
    }

    /// In-memory database, used by tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock();
        migrations::run_migrations(&conn)
    }

    // ========== Portfolio Methods ==========

    /// Insert or replace a holding
    pub fn upsert_holding(&self, ticker: &str, shares: f64) -> Result<Holding> {
        let conn = self.conn.lock();
        portfolio::upsert_holding(&conn, ticker, shares)
    }

    /// Update the share count of an existing holding
    pub fn update_holding(&self, ticker: &str, shares: f64) -> Result<Holding> {
        let conn = self.conn.lock();
        portfolio::update_holding(&conn, ticker, shares)
    }

    /// Delete a holding; returns whether a row existed
    pub fn delete_holding(&self, ticker: &str) -> Result<bool> {
        let conn = self.conn.lock();
        portfolio::delete_holding(&conn, ticker)
    }

    /// All holdings, alphabetically by ticker
    pub fn list_holdings(&self) -> Result<Vec<Holding>> {
        let conn = self.conn.lock();
        portfolio::list_holdings(&conn)
    }
}

impl MarketStore for SqliteDb {
    fn fetch_prices(&self, ticker: &str, period: Period) -> Result<Vec<OhlcRow>> {
        let conn = self.conn.lock();
        market::fetch_prices(&conn, ticker, period)
    }

    fn fetch_volume(
        &self,
        ticker: &str,
        period: Period,
        bucket: VolumeBucket,
    ) -> Result<Vec<VolumeRow>> {
        let conn = self.conn.lock();
        market::fetch_volume(&conn, ticker, period, bucket)
    }

    fn fetch_close_series(&self, tickers: &[String], period: Period) -> Result<Vec<CloseRow>> {
        let conn = self.conn.lock();
        market::fetch_close_series(&conn, tickers, period)
    }

    fn list_tickers(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        market::list_tickers(&conn)
    }

    fn latest_prices(&self, tickers: &[String]) -> Result<HashMap<String, f64>> {
        let conn = self.conn.lock();
        market::latest_prices(&conn, tickers)
    }

    fn fetch_sectors(&self) -> Result<Vec<SectorRow>> {
        let conn = self.conn.lock();
        market::fetch_sectors(&conn)
    }

    fn insert_prices(&self, rows: &[PriceRow]) -> Result<usize> {
        let mut conn = self.conn.lock();
        market::insert_prices(&mut conn, rows)
    }

    fn insert_sectors(&self, rows: &[SectorRow]) -> Result<usize> {
        let mut conn = self.conn.lock();
        market::insert_sectors(&mut conn, rows)
    }
}
