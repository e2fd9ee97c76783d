//! Market data queries (warehouse backend)
//!
//! Same logical queries as the embedded backend, phrased for DuckDB:
//! `DATE`-typed columns, `current_date - to_days(?)` lookback arithmetic,
//! and tables resolved through the configured namespace.

use super::Namespace;
use crate::db::{CloseRow, OhlcRow, PriceRow, SectorRow, VolumeRow};
use crate::error::Result;
use crate::filters::{Period, VolumeBucket};
use duckdb::{params, Connection, ToSql};
use std::collections::HashMap;

/// Ordered-by-date OHLC rows for one ticker
pub fn fetch_prices(
    conn: &Connection,
    namespace: &Namespace,
    ticker: &str,
    period: Period,
) -> Result<Vec<OhlcRow>> {
    let mut sql = format!(
        "SELECT strftime(date, '%Y-%m-%d'), open, close, high, low FROM {}
         WHERE ticker = ?",
        namespace.prices()
    );
    let mut params_vec: Vec<Box<dyn ToSql>> = vec![Box::new(ticker.to_string())];

    if let Some(days) = period.days() {
        sql.push_str(" AND date > current_date - to_days(?)");
        params_vec.push(Box::new(days as i32));
    }
    sql.push_str(" ORDER BY date ASC");

    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_refs.as_slice(), |row| {
            Ok(OhlcRow {
                date: row.get(0)?,
                open: row.get(1)?,
                close: row.get(2)?,
                high: row.get(3)?,
                low: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Ordered-by-date volume rows for one ticker within a volume range
pub fn fetch_volume(
    conn: &Connection,
    namespace: &Namespace,
    ticker: &str,
    period: Period,
    bucket: VolumeBucket,
) -> Result<Vec<VolumeRow>> {
    let (min_volume, max_volume) = bucket.range();

    let mut sql = format!(
        "SELECT strftime(date, '%Y-%m-%d'), ticker, volume FROM {}
         WHERE ticker = ? AND volume >= ?",
        namespace.prices()
    );
    let mut params_vec: Vec<Box<dyn ToSql>> =
        vec![Box::new(ticker.to_string()), Box::new(min_volume)];

    if let Some(max_volume) = max_volume {
        sql.push_str(" AND volume < ?");
        params_vec.push(Box::new(max_volume));
    }
    if let Some(days) = period.days() {
        sql.push_str(" AND date > current_date - to_days(?)");
        params_vec.push(Box::new(days as i32));
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
/// `MAX(close)` collapses duplicate same-day rows.
pub fn fetch_close_series(
    conn: &Connection,
    namespace: &Namespace,
    tickers: &[String],
    period: Period,
) -> Result<Vec<CloseRow>> {
    if tickers.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; tickers.len()].join(", ");
    let mut sql = format!(
        "SELECT ticker, strftime(date, '%Y-%m-%d'), MAX(close) AS close FROM {}
         WHERE ticker IN ({})",
        namespace.prices(),
        placeholders
    );
    let mut params_vec: Vec<Box<dyn ToSql>> = tickers
        .iter()
        .map(|t| Box::new(t.clone()) as Box<dyn ToSql>)
        .collect();

    if let Some(days) = period.days() {
        sql.push_str(" AND date > current_date - to_days(?)");
        params_vec.push(Box::new(days as i32));
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
pub fn list_tickers(conn: &Connection, namespace: &Namespace) -> Result<Vec<String>> {
    let sql = format!(
        "SELECT DISTINCT ticker FROM {} ORDER BY ticker",
        namespace.sectors()
    );
    let mut stmt = conn.prepare(&sql)?;
    let tickers = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(tickers)
}

/// Close per requested ticker on the most recent date in the price table
pub fn latest_prices(
    conn: &Connection,
    namespace: &Namespace,
    tickers: &[String],
) -> Result<HashMap<String, f64>> {
    if tickers.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders = vec!["?"; tickers.len()].join(", ");
    let sql = format!(
        "SELECT ticker, close FROM {table}
         WHERE date = (SELECT MAX(date) FROM {table})
           AND ticker IN ({placeholders})",
        table = namespace.prices(),
        placeholders = placeholders
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
pub fn fetch_sectors(conn: &Connection, namespace: &Namespace) -> Result<Vec<SectorRow>> {
    let sql = format!(
        "SELECT ticker, sector FROM {} ORDER BY ticker",
        namespace.sectors()
    );
    let mut stmt = conn.prepare(&sql)?;
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
pub fn insert_prices(
    conn: &mut Connection,
    namespace: &Namespace,
    rows: &[PriceRow],
) -> Result<usize> {
    let tx = conn.transaction()?;

    {
        let sql = format!(
            "INSERT INTO {} (ticker, date, open, high, low, close, volume)
             VALUES (?, CAST(? AS DATE), ?, ?, ?, ?, ?)
             ON CONFLICT (ticker, date) DO UPDATE SET
               open = excluded.open, high = excluded.high, low = excluded.low,
               close = excluded.close, volume = excluded.volume",
            namespace.prices()
        );
        let mut stmt = tx.prepare(&sql)?;

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
pub fn insert_sectors(
    conn: &mut Connection,
    namespace: &Namespace,
    rows: &[SectorRow],
) -> Result<usize> {
    let tx = conn.transaction()?;

    {
        let sql = format!(
            "INSERT INTO {} (ticker, sector) VALUES (?, ?)
             ON CONFLICT (ticker) DO UPDATE SET sector = excluded.sector",
            namespace.sectors()
        );
        let mut stmt = tx.prepare(&sql)?;

        for row in rows {
            stmt.execute(params![row.ticker, row.sector])?;
        }
    }

    tx.commit()?;
    Ok(rows.len())
}
