//! Market data service
//!
//! Chart-facing queries over whichever [`MarketStore`] backend is wired
//! in. Every operation degrades to an empty result on failure; the
//! presentation layer renders an empty-chart placeholder, never an error
//! state.

use crate::analytics::{self, CorrelationMatrix};
use crate::db::{MarketStore, OhlcRow, SectorRow, VolumeRow};
use crate::filters::{Period, VolumeBucket};
use std::collections::HashMap;
use tracing::{error, warn};

/// Market data service for chart queries
pub struct MarketService;

impl MarketService {
    /// Ordered-by-date OHLC history for one ticker
    pub fn price_history(store: &dyn MarketStore, ticker: &str, period: Period) -> Vec<OhlcRow> {
        match store.fetch_prices(ticker, period) {
            Ok(rows) => rows,
            Err(e) => {
                error!("Price query failed for {}: {}", ticker, e);
                Vec::new()
            }
        }
    }

    /// Ordered-by-date volume history for one ticker within a bucket
    pub fn volume_history(
        store: &dyn MarketStore,
        ticker: &str,
        period: Period,
        bucket: VolumeBucket,
    ) -> Vec<VolumeRow> {
        match store.fetch_volume(ticker, period, bucket) {
            Ok(rows) => rows,
            Err(e) => {
                error!("Volume query failed for {}: {}", ticker, e);
                Vec::new()
            }
        }
    }

    /// Pairwise correlation matrix over the tickers' shared trading dates
    pub fn correlation(
        store: &dyn MarketStore,
        tickers: &[String],
        period: Period,
    ) -> CorrelationMatrix {
        if tickers.len() < 2 {
            warn!("Correlation requested for {} ticker(s)", tickers.len());
            return CorrelationMatrix::empty();
        }

        match store.fetch_close_series(tickers, period) {
            Ok(rows) => analytics::correlation_matrix(&rows),
            Err(e) => {
                error!("Correlation query failed for {:?}: {}", tickers, e);
                CorrelationMatrix::empty()
            }
        }
    }

    /// The ticker universe, alphabetically sorted; empty on failure
    pub fn tickers(store: &dyn MarketStore) -> Vec<String> {
        match store.list_tickers() {
            Ok(tickers) => tickers,
            Err(e) => {
                error!("Ticker listing failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Latest close per requested ticker; tickers with no row on the most
    /// recent trading date are absent
    pub fn latest_prices(store: &dyn MarketStore, tickers: &[String]) -> HashMap<String, f64> {
        match store.latest_prices(tickers) {
            Ok(prices) => prices,
            Err(e) => {
                error!("Latest price lookup failed: {}", e);
                HashMap::new()
            }
        }
    }

    /// Full sector reference table; empty on failure
    pub fn sectors(store: &dyn MarketStore) -> Vec<SectorRow> {
        match store.fetch_sectors() {
            Ok(rows) => rows,
            Err(e) => {
                error!("Sector query failed: {}", e);
                Vec::new()
            }
        }
    }
}
