//! DuckDB database module
//!
//! The warehouse backend. Speaks the same [`MarketStore`] capability as
//! the embedded store but against an analytical DuckDB file whose tables
//! may live under a configured schema (the warehouse dataset namespace).

mod market;
mod migrations;

use crate::db::{CloseRow, MarketStore, OhlcRow, PriceRow, SectorRow, VolumeRow};
use crate::error::Result;
use crate::filters::{Period, VolumeBucket};
use duckdb::Connection;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;

/// Qualified table names for one warehouse namespace
#[derive(Debug, Clone)]
pub struct Namespace {
    schema: Option<String>,
}

impl Namespace {
    pub fn new(schema: Option<String>) -> Self {
        Self { schema }
    }

    fn qualify(&self, table: &str) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, table),
            None => table.to_string(),
        }
    }

    pub fn prices(&self) -> String {
        self.qualify("stock_prices")
    }

    pub fn sectors(&self) -> String {
        self.qualify("stock_sector")
    }
}

/// DuckDB database wrapper
pub struct DuckDb {
    conn: Mutex<Connection>,
    namespace: Namespace,
}

impl DuckDb {
    /// Create new DuckDB connection
    pub fn new(path: &Path, schema: Option<String>) -> Result<Self> {
        let conn = Connection::open(path)?;

        let db = Self {
            conn: Mutex::new(conn),
            namespace: Namespace::new(schema),
        };

        db.run_migrations()?;

        Ok(db)
    }

    /// In-memory database, used by tests
    pub fn open_in_memory(schema: Option<String>) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
            namespace: Namespace::new(schema),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock();
        migrations::run_migrations(&conn, &self.namespace)
    }
}

impl MarketStore for DuckDb {
    fn fetch_prices(&self, ticker: &str, period: Period) -> Result<Vec<OhlcRow>> {
        let conn = self.conn.lock();
        market::fetch_prices(&conn, &self.namespace, ticker, period)
    }

    fn fetch_volume(
        &self,
        ticker: &str,
        period: Period,
        bucket: VolumeBucket,
    ) -> Result<Vec<VolumeRow>> {
        let conn = self.conn.lock();
        market::fetch_volume(&conn, &self.namespace, ticker, period, bucket)
    }

    fn fetch_close_series(&self, tickers: &[String], period: Period) -> Result<Vec<CloseRow>> {
        let conn = self.conn.lock();
        market::fetch_close_series(&conn, &self.namespace, tickers, period)
    }

    fn list_tickers(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        market::list_tickers(&conn, &self.namespace)
    }

    fn latest_prices(&self, tickers: &[String]) -> Result<HashMap<String, f64>> {
        let conn = self.conn.lock();
        market::latest_prices(&conn, &self.namespace, tickers)
    }

    fn fetch_sectors(&self) -> Result<Vec<SectorRow>> {
        let conn = self.conn.lock();
        market::fetch_sectors(&conn, &self.namespace)
    }

    fn insert_prices(&self, rows: &[PriceRow]) -> Result<usize> {
        let mut conn = self.conn.lock();
        market::insert_prices(&mut conn, &self.namespace, rows)
    }

    fn insert_sectors(&self, rows: &[SectorRow]) -> Result<usize> {
        let mut conn = self.conn.lock();
        market::insert_sectors(&mut conn, &self.namespace, rows)
    }
}
