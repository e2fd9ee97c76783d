//! Portfolio service
//!
//! Holding mutations (validated, surfaced as errors), valuation against
//! the latest closes, and the sector aggregation feeding the portfolio
//! dashboard's pie chart.

use crate::db::sqlite::{Holding, SqliteDb};
use crate::db::{MarketStore, SectorRow};
use crate::error::{AppError, Result};
use crate::services::MarketService;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::error;

/// A holding joined with its latest close.
///
/// `price` and `value` are absent when the ticker has no row on the most
/// recent trading date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuedHolding {
    pub ticker: String,
    pub shares: f64,
    pub price: Option<f64>,
    pub value: Option<f64>,
}

/// Total portfolio value in one sector.
///
/// `sector` is `None` for holdings whose ticker is missing from the
/// sector reference table; the presentation layer decides the label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorTotal {
    pub sector: Option<String>,
    pub total_value: f64,
}

/// Portfolio service for holding mutations and derived views
pub struct PortfolioService;

impl PortfolioService {
    fn validate(ticker: &str, shares: f64) -> Result<String> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(AppError::Validation("Ticker must not be empty".to_string()));
        }
        if !shares.is_finite() || shares <= 0.0 {
            return Err(AppError::Validation(format!(
                "Shares must be a positive number, got {}",
                shares
            )));
        }
        Ok(ticker.to_uppercase())
    }

    /// Add a holding, replacing the share count if the ticker exists
    pub fn add_holding(db: &SqliteDb, ticker: &str, shares: f64) -> Result<Holding> {
        let ticker = Self::validate(ticker, shares)?;
        db.upsert_holding(&ticker, shares)
    }

    /// Change the share count of an existing holding
    pub fn edit_holding(db: &SqliteDb, ticker: &str, shares: f64) -> Result<Holding> {
        let ticker = Self::validate(ticker, shares)?;
        db.update_holding(&ticker, shares)
    }

    /// Remove a holding
    pub fn remove_holding(db: &SqliteDb, ticker: &str) -> Result<()> {
        let ticker = ticker.trim().to_uppercase();
        if !db.delete_holding(&ticker)? {
            return Err(AppError::NotFound(format!("Holding {} not found", ticker)));
        }
        Ok(())
    }

    /// All holdings valued at the latest close (value = shares x close).
    ///
    /// Fail-soft: storage failures are logged and yield an empty list.
    pub fn valued_holdings(db: &SqliteDb, market: &dyn MarketStore) -> Vec<ValuedHolding> {
        let holdings = match db.list_holdings() {
            Ok(holdings) => holdings,
            Err(e) => {
                error!("Holding listing failed: {}", e);
                return Vec::new();
            }
        };
        if holdings.is_empty() {
            return Vec::new();
        }

        let tickers: Vec<String> = holdings.iter().map(|h| h.ticker.clone()).collect();
        let prices = MarketService::latest_prices(market, &tickers);

        holdings
            .into_iter()
            .map(|h| {
                let price = prices.get(&h.ticker).copied();
                ValuedHolding {
                    value: price.map(|p| p * h.shares),
                    ticker: h.ticker,
                    shares: h.shares,
                    price,
                }
            })
            .collect()
    }

    /// Left-join valued holdings to the sector map and sum value per
    /// sector, sorted descending by total.
    ///
    /// Holdings without a latest price carry no value and are skipped;
    /// holdings without a sector mapping are grouped under `None`.
    pub fn aggregate_by_sector(
        holdings: &[ValuedHolding],
        sectors: &[SectorRow],
    ) -> Vec<SectorTotal> {
        let sector_of: HashMap<&str, &str> = sectors
            .iter()
            .map(|s| (s.ticker.as_str(), s.sector.as_str()))
            .collect();

        let mut totals: HashMap<Option<String>, f64> = HashMap::new();
        for holding in holdings {
            let value = match holding.value {
                Some(value) => value,
                None => continue,
            };
            let sector = sector_of
                .get(holding.ticker.as_str())
                .map(|s| s.to_string());
            *totals.entry(sector).or_insert(0.0) += value;
        }

        let mut aggregated: Vec<SectorTotal> = totals
            .into_iter()
            .map(|(sector, total_value)| SectorTotal {
                sector,
                total_value,
            })
            .collect();

        // Descending by value; sector name breaks ties deterministically
        aggregated.sort_by(|a, b| {
            b.total_value
                .partial_cmp(&a.total_value)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.sector.cmp(&b.sector))
        });

        aggregated
    }

    /// The portfolio dashboard's sector breakdown, end to end
    pub fn sector_breakdown(db: &SqliteDb, market: &dyn MarketStore) -> Vec<SectorTotal> {
        let holdings = Self::valued_holdings(db, market);
        if holdings.is_empty() {
            return Vec::new();
        }
        let sectors = MarketService::sectors(market);
        Self::aggregate_by_sector(&holdings, &sectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::PriceRow;

    fn sector(ticker: &str, sector: &str) -> SectorRow {
        SectorRow {
            ticker: ticker.to_string(),
            sector: sector.to_string(),
        }
    }

    fn valued(ticker: &str, value: f64) -> ValuedHolding {
        ValuedHolding {
            ticker: ticker.to_string(),
            shares: 1.0,
            price: Some(value),
            value: Some(value),
        }
    }

    #[test]
    fn aggregation_sums_and_sorts_descending() {
        let holdings = vec![valued("A", 100.0), valued("B", 50.0)];
        let sectors = vec![sector("A", "Tech"), sector("B", "Health")];

        let totals = PortfolioService::aggregate_by_sector(&holdings, &sectors);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].sector.as_deref(), Some("Tech"));
        assert_eq!(totals[0].total_value, 100.0);
        assert_eq!(totals[1].sector.as_deref(), Some("Health"));
        assert_eq!(totals[1].total_value, 50.0);
    }

    #[test]
    fn same_sector_holdings_are_summed() {
        let holdings = vec![valued("A", 100.0), valued("B", 50.0)];
        let sectors = vec![sector("A", "Tech"), sector("B", "Tech")];

        let totals = PortfolioService::aggregate_by_sector(&holdings, &sectors);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].total_value, 150.0);
    }

    #[test]
    fn unmapped_ticker_keeps_a_null_sector() {
        let holdings = vec![valued("A", 100.0), valued("MYSTERY", 40.0)];
        let sectors = vec![sector("A", "Tech")];

        let totals = PortfolioService::aggregate_by_sector(&holdings, &sectors);
        assert_eq!(totals.len(), 2);
        assert!(totals.iter().any(|t| t.sector.is_none() && t.total_value == 40.0));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(PortfolioService::aggregate_by_sector(&[], &[]).is_empty());
    }

    #[test]
    fn holdings_without_value_are_skipped() {
        let holdings = vec![
            valued("A", 100.0),
            ValuedHolding {
                ticker: "DELISTED".to_string(),
                shares: 3.0,
                price: None,
                value: None,
            },
        ];
        let sectors = vec![sector("A", "Tech"), sector("DELISTED", "Tech")];

        let totals = PortfolioService::aggregate_by_sector(&holdings, &sectors);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].total_value, 100.0);
    }

    #[test]
    fn add_holding_validates_input() {
        let db = SqliteDb::open_in_memory().unwrap();

        assert!(matches!(
            PortfolioService::add_holding(&db, "  ", 10.0),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            PortfolioService::add_holding(&db, "AAPL", 0.0),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            PortfolioService::add_holding(&db, "AAPL", -3.0),
            Err(AppError::Validation(_))
        ));

        let holding = PortfolioService::add_holding(&db, " aapl ", 10.0).unwrap();
        assert_eq!(holding.ticker, "AAPL");
    }

    #[test]
    fn valuation_uses_latest_close() {
        let db = SqliteDb::open_in_memory().unwrap();
        db.insert_prices(&[
            PriceRow {
                ticker: "AAPL".to_string(),
                date: "2024-01-02".to_string(),
                open: 99.0,
                high: 101.0,
                low: 98.0,
                close: 100.0,
                volume: 1000,
            },
            PriceRow {
                ticker: "AAPL".to_string(),
                date: "2024-01-03".to_string(),
                open: 100.0,
                high: 111.0,
                low: 99.0,
                close: 110.0,
                volume: 1000,
            },
        ])
        .unwrap();
        PortfolioService::add_holding(&db, "AAPL", 2.0).unwrap();
        PortfolioService::add_holding(&db, "GONE", 5.0).unwrap();

        let holdings = PortfolioService::valued_holdings(&db, &db);
        assert_eq!(holdings.len(), 2);

        let aapl = holdings.iter().find(|h| h.ticker == "AAPL").unwrap();
        assert_eq!(aapl.price, Some(110.0));
        assert_eq!(aapl.value, Some(220.0));

        let gone = holdings.iter().find(|h| h.ticker == "GONE").unwrap();
        assert!(gone.price.is_none());
        assert!(gone.value.is_none());
    }

    #[test]
    fn remove_missing_holding_is_not_found() {
        let db = SqliteDb::open_in_memory().unwrap();
        assert!(matches!(
            PortfolioService::remove_holding(&db, "AAPL"),
            Err(AppError::NotFound(_))
        ));
    }
}
