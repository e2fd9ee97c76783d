//! Market data queries (embedded backend)
//!
//! Date bounds use SQLite's relative-offset modifiers
//! (`date('now', '-30 days')`); volume bounds are half-open per
//! [`VolumeBucket::range`].

use crate::db::{CloseRow, OhlcRow, PriceRow, SectorRow, VolumeRow};
use crate::error::Result;
use crate::filters::{Period, VolumeBucket};
use rusqlite::{params, Connection, ToSql};
use std::collections::HashMap;

fn period_modifier(days: i64) -> String {
    format!("-{} days", days)
}

/// Ordered-by-date OHLC rows for one ticker
pub fn fetch_prices(conn: &Connection, ticker: &str, period: Period) -> Result<Vec<OhlcRow>> {
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<OhlcRow> {
        Ok(OhlcRow {
            date: row.get(0)?,
            open: row.get(1)?,
            close: row.get(2)?,
            high: row.get(3)?,
            low: row.get(4)?,
        })
    }

    let rows = match period.days() {
        Some(days) => {
            let mut stmt = conn.prepare(
                "SELECT date, open, close, high, low FROM stock_prices
                 WHERE ticker = ?1 AND date > date('now', ?2)
                 ORDER BY date ASC",
            )?;
            let rows = stmt
                .query_map(params![ticker, period_modifier(days)], map_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT date, open, close, high, low FROM stock_prices
                 WHERE ticker = ?1
                 ORDER BY date ASC",
            )?;
            let rows = stmt
                .query_map(params![ticker], map_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        }
    };

    Ok(rows)
}

/// Ordered-by-date volume rows for one ticker within a volume range
pub fn fetch_volume(
    conn: &Connection,
    ticker: &str,
    period: Period,
    bucket: VolumeBucket,
) -> Result<Vec<VolumeRow>> {
    let (min_volume, max_volume) = bucket.range();

    let mut sql = String::from(
        "SELECT date, ticker, volume FROM stock_prices
         WHERE ticker = ? AND volume >= ?",
    );
    let mut params_vec: Vec<Box<dyn ToSql>> =
        vec![Box::new(ticker.to_string()), Box::new(min_volume)];

    if let Some(max_volume) = max_volume {
        sql.push_str(" AND volume < ?");
        params_vec.push(Box::new(max_volume));
    }
    if let Some(days) = period.days() {
        sql.push_str(" AND date > date('now', ?)");
        params_vec.push(Box::new(period_modifier(days)));
    }
    sql.push_str(" ORDER BY date ASC");

    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_refs.as_slice(), |row| {
            Ok(VolumeRow {
                date: row.get(0)?,
                ticker: row.get(1)?,
                volume: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// One close per (ticker, date) for the requested tickers.
///
/// `MAX(close)` collapses duplicate same-day rows the warehouse may carry.
pub fn fetch_close_series(
    conn: &Connection,
    tickers: &[String],
    period: Period,
) -> Result<Vec<CloseRow>> {
    if tickers.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; tickers.len()].join(", ");
    let mut sql = format!(
        "SELECT ticker, date, MAX(close) AS close FROM stock_prices
         WHERE ticker IN ({})",
        placeholders
    );
    let mut params_vec: Vec<Box<dyn ToSql>> = tickers
        .iter()
        .map(|t| Box::new(t.clone()) as Box<dyn ToSql>)
        .collect();

    if let Some(days) = period.days() {
        sql.push_str(" AND date > date('now', ?)");
        params_vec.push(Box::new(period_modifier(days)));
    }
    sql.push_str(" GROUP BY ticker, date ORDER BY date ASC");

    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_refs.as_slice(), |row| {
            Ok(CloseRow {
                ticker: row.get(0)?,
                date: row.get(1)?,
                close: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Distinct tickers from the sector table, alphabetically sorted
pub fn list_tickers(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT DISTINCT ticker FROM stock_sector ORDER BY ticker")?;
    let tickers = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(tickers)
}

/// Close per requested ticker on the most recent date in the price table
pub fn latest_prices(conn: &Connection, tickers: &[String]) -> Result<HashMap<String, f64>> {
    if tickers.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders = vec!["?"; tickers.len()].join(", ");
    let sql = format!(
        "SELECT ticker, close FROM stock_prices
         WHERE date = (SELECT MAX(date) FROM stock_prices)
           AND ticker IN ({})",
        placeholders
    );
    let params_refs: Vec<&dyn ToSql> = tickers.iter().map(|t| t as &dyn ToSql).collect();

    let mut stmt = conn.prepare(&sql)?;
    let prices = stmt
        .query_map(params_refs.as_slice(), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?
        .collect::<std::result::Result<HashMap<_, _>, _>>()?;

    Ok(prices)
}

/// Full sector reference table
pub fn fetch_sectors(conn: &Connection) -> Result<Vec<SectorRow>> {
    let mut stmt = conn.prepare("SELECT ticker, sector FROM stock_sector ORDER BY ticker")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(SectorRow {
                ticker: row.get(0)?,
                sector: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Bulk-ingest price rows (upsert on (ticker, date))
pub fn insert_prices(conn: &mut Connection, rows: &[PriceRow]) -> Result<usize> {
    let tx = conn.transaction()?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO stock_prices (ticker, date, open, high, low, close, volume)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (ticker, date) DO UPDATE SET
               open = excluded.open, high = excluded.high, low = excluded.low,
               close = excluded.close, volume = excluded.volume",
        )?;

        for row in rows {
            stmt.execute(params![
                row.ticker, row.date, row.open, row.high, row.low, row.close, row.volume,
            ])?;
        }
    }

    tx.commit()?;
    Ok(rows.len())
}

/// Bulk-ingest sector rows (upsert on ticker)
pub fn insert_sectors(conn: &mut Connection, rows: &[SectorRow]) -> Result<usize> {
    let tx = conn.transaction()?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO stock_sector (ticker, sector) VALUES (?1, ?2)
             ON CONFLICT (ticker) DO UPDATE SET sector = excluded.sector",
        )?;

        for row in rows {
            stmt.execute(params![row.ticker, row.sector])?;
        }
    }

    tx.commit()?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn create_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        super::super::migrations::run_migrations(&conn).unwrap();
        conn
    }

    fn days_ago(n: i64) -> String {
        (Utc::now().date_naive() - Duration::days(n))
            .format("%Y-%m-%d")
            .to_string()
    }

    fn price(ticker: &str, date: &str, close: f64, volume: i64) -> PriceRow {
        PriceRow {
            ticker: ticker.to_string(),
            date: date.to_string(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume,
        }
    }

    #[test]
    fn fetch_prices_unknown_ticker_is_empty() {
        let mut conn = create_test_db();
        insert_prices(&mut conn, &[price("AAPL", &days_ago(1), 100.0, 1000)]).unwrap();

        let rows = fetch_prices(&conn, "ZZZZ", Period::Max).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn fetch_prices_respects_period() {
        let mut conn = create_test_db();
        insert_prices(
            &mut conn,
            &[
                price("AAPL", &days_ago(400), 90.0, 1000),
                price("AAPL", &days_ago(100), 95.0, 1000),
                price("AAPL", &days_ago(5), 100.0, 1000),
            ],
        )
        .unwrap();

        let all = fetch_prices(&conn, "AAPL", Period::Max).unwrap();
        assert_eq!(all.len(), 3);

        let year = fetch_prices(&conn, "AAPL", Period::OneYear).unwrap();
        assert_eq!(year.len(), 2);

        let month = fetch_prices(&conn, "AAPL", Period::OneMonth).unwrap();
        assert_eq!(month.len(), 1);
        assert_eq!(month[0].close, 100.0);
    }

    #[test]
    fn fetch_prices_ordered_ascending() {
        let mut conn = create_test_db();
        insert_prices(
            &mut conn,
            &[
                price("AAPL", &days_ago(1), 102.0, 1000),
                price("AAPL", &days_ago(3), 100.0, 1000),
                price("AAPL", &days_ago(2), 101.0, 1000),
            ],
        )
        .unwrap();

        let rows = fetch_prices(&conn, "AAPL", Period::Max).unwrap();
        let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }

    #[test]
    fn fetch_volume_bounds_are_half_open() {
        let mut conn = create_test_db();
        insert_prices(
            &mut conn,
            &[
                price("AAPL", &days_ago(4), 100.0, 99_999),
                price("AAPL", &days_ago(3), 100.0, 100_000),
                price("AAPL", &days_ago(2), 100.0, 499_999),
                price("AAPL", &days_ago(1), 100.0, 500_000),
            ],
        )
        .unwrap();

        let low = fetch_volume(&conn, "AAPL", Period::Max, VolumeBucket::Low).unwrap();
        let volumes: Vec<i64> = low.iter().map(|r| r.volume).collect();
        assert_eq!(volumes, vec![100_000, 499_999]);

        let all = fetch_volume(&conn, "AAPL", Period::Max, VolumeBucket::All).unwrap();
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn fetch_volume_unbounded_upper() {
        let mut conn = create_test_db();
        insert_prices(
            &mut conn,
            &[
                price("AAPL", &days_ago(2), 100.0, 4_999_999),
                price("AAPL", &days_ago(1), 100.0, 5_000_000),
            ],
        )
        .unwrap();

        let rows = fetch_volume(&conn, "AAPL", Period::Max, VolumeBucket::VeryHigh).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].volume, 5_000_000);
    }

    #[test]
    fn fetch_close_series_filters_tickers() {
        let mut conn = create_test_db();
        insert_prices(
            &mut conn,
            &[
                price("AAPL", &days_ago(1), 100.0, 1000),
                price("MSFT", &days_ago(1), 200.0, 1000),
                price("GOOG", &days_ago(1), 300.0, 1000),
            ],
        )
        .unwrap();

        let rows = fetch_close_series(
            &conn,
            &["AAPL".to_string(), "MSFT".to_string()],
            Period::Max,
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.ticker != "GOOG"));
    }

    #[test]
    fn fetch_close_series_empty_ticker_list() {
        let conn = create_test_db();
        let rows = fetch_close_series(&conn, &[], Period::Max).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn latest_prices_omits_tickers_without_latest_row() {
        let mut conn = create_test_db();
        insert_prices(
            &mut conn,
            &[
                price("AAPL", &days_ago(2), 99.0, 1000),
                price("AAPL", &days_ago(1), 100.0, 1000),
                // MSFT stopped trading before the latest date
                price("MSFT", &days_ago(2), 200.0, 1000),
            ],
        )
        .unwrap();

        let prices = latest_prices(&conn, &["AAPL".to_string(), "MSFT".to_string()]).unwrap();
        assert_eq!(prices.len(), 1);
        assert_eq!(prices.get("AAPL"), Some(&100.0));
        assert!(!prices.contains_key("MSFT"));
    }

    #[test]
    fn list_tickers_distinct_and_sorted() {
        let mut conn = create_test_db();
        insert_sectors(
            &mut conn,
            &[
                SectorRow {
                    ticker: "MSFT".to_string(),
                    sector: "Tech".to_string(),
                },
                SectorRow {
                    ticker: "AAPL".to_string(),
                    sector: "Tech".to_string(),
                },
            ],
        )
        .unwrap();

        let tickers = list_tickers(&conn).unwrap();
        assert_eq!(tickers, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn insert_prices_upserts_on_conflict() {
        let mut conn = create_test_db();
        let date = days_ago(1);
        insert_prices(&mut conn, &[price("AAPL", &date, 100.0, 1000)]).unwrap();
        insert_prices(&mut conn, &[price("AAPL", &date, 105.0, 2000)]).unwrap();

        let rows = fetch_prices(&conn, "AAPL", Period::Max).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].close, 105.0);
    }
}
