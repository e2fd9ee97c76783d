//! Storage layer
//!
//! One logical set of market-data queries, two backends: the embedded
//! SQLite store and the DuckDB warehouse. Both implement [`MarketStore`],
//! so the service layer never sees which one is wired in.

pub mod duckdb;
pub mod sqlite;

use crate::error::Result;
use crate::filters::{Period, VolumeBucket};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One OHLCV row per (ticker, date); immutable once ingested
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRow {
    pub ticker: String,
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Price-history row as rendered by the line/candlestick charts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OhlcRow {
    pub date: String,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
}

/// Volume-history row as rendered by the volume chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeRow {
    pub date: String,
    pub ticker: String,
    pub volume: i64,
}

/// Per-(ticker, date) closing price feeding the correlation pivot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseRow {
    pub ticker: String,
    pub date: String,
    pub close: f64,
}

/// Static ticker-to-sector reference row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorRow {
    pub ticker: String,
    pub sector: String,
}

/// Market-data query capability shared by both backends.
///
/// Every operation is one round trip under a scoped connection lock; the
/// lock is released when the call returns, success or failure. Errors
/// propagate typed — degrading to empty results is the service layer's
/// job, not the store's.
pub trait MarketStore: Send + Sync {
    /// Ordered-by-date OHLC rows for one ticker, bounded by the period
    fn fetch_prices(&self, ticker: &str, period: Period) -> Result<Vec<OhlcRow>>;

    /// Ordered-by-date volume rows for one ticker, bounded by period and
    /// the resolved volume range
    fn fetch_volume(
        &self,
        ticker: &str,
        period: Period,
        bucket: VolumeBucket,
    ) -> Result<Vec<VolumeRow>>;

    /// One row per (ticker, date) with the maximum close for that day,
    /// for the requested tickers, bounded by the period
    fn fetch_close_series(&self, tickers: &[String], period: Period) -> Result<Vec<CloseRow>>;

    /// Distinct tickers from the sector table, alphabetically sorted
    fn list_tickers(&self) -> Result<Vec<String>>;

    /// Closing price per requested ticker on the most recent date in the
    /// price table; tickers with no row on that date are absent
    fn latest_prices(&self, tickers: &[String]) -> Result<HashMap<String, f64>>;

    /// Full sector reference table
    fn fetch_sectors(&self) -> Result<Vec<SectorRow>>;

    /// Bulk-ingest price rows (upsert on (ticker, date))
    fn insert_prices(&self, rows: &[PriceRow]) -> Result<usize>;

    /// Bulk-ingest sector rows (upsert on ticker)
    fn insert_sectors(&self, rows: &[SectorRow]) -> Result<usize>;
}
