//! Portfolio holdings CRUD
//!
//! The only locally mutable data in the system. One row per ticker; each
//! mutation is persisted immediately, no cross-holding batching.

use crate::error::{AppError, Result};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

/// A portfolio holding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: String,
    pub shares: f64,
    pub updated_at: String,
}

/// Insert a holding, replacing the share count if the ticker already exists
pub fn upsert_holding(conn: &Connection, ticker: &str, shares: f64) -> Result<Holding> {
    let updated_at = chrono::Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO portfolio_holdings (ticker, shares, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT (ticker) DO UPDATE SET
           shares = excluded.shares, updated_at = excluded.updated_at",
        params![ticker, shares, updated_at],
    )?;

    tracing::info!("Saved holding: {} ({} shares)", ticker, shares);

    Ok(Holding {
        ticker: ticker.to_string(),
        shares,
        updated_at,
    })
}

/// Update the share count of an existing holding
pub fn update_holding(conn: &Connection, ticker: &str, shares: f64) -> Result<Holding> {
    let updated_at = chrono::Utc::now().to_rfc3339();

    let rows = conn.execute(
        "UPDATE portfolio_holdings SET shares = ?1, updated_at = ?2 WHERE ticker = ?3",
        params![shares, updated_at, ticker],
    )?;

    if rows == 0 {
        return Err(AppError::NotFound(format!("Holding {} not found", ticker)));
    }

    Ok(Holding {
        ticker: ticker.to_string(),
        shares,
        updated_at,
    })
}

/// Delete a holding; returns whether a row existed
pub fn delete_holding(conn: &Connection, ticker: &str) -> Result<bool> {
    let rows = conn.execute(
        "DELETE FROM portfolio_holdings WHERE ticker = ?1",
        params![ticker],
    )?;
    Ok(rows > 0)
}

/// All holdings, alphabetically by ticker
pub fn list_holdings(conn: &Connection) -> Result<Vec<Holding>> {
    let mut stmt = conn.prepare(
        "SELECT ticker, shares, updated_at FROM portfolio_holdings ORDER BY ticker",
    )?;

    let holdings = stmt
        .query_map([], |row| {
            Ok(Holding {
                ticker: row.get(0)?,
                shares: row.get(1)?,
                updated_at: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(holdings)
}
