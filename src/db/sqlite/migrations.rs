//! SQLite database migrations

use crate::error::Result;
use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Create migrations table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    // Run each migration
    run_migration(conn, "001_stock_prices", CREATE_STOCK_PRICES_TABLE)?;
    run_migration(conn, "002_stock_sector", CREATE_STOCK_SECTOR_TABLE)?;
    run_migration(conn, "003_portfolio_holdings", CREATE_PORTFOLIO_HOLDINGS_TABLE)?;

    tracing::info!("Database migrations completed");
    Ok(())
}

fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
    // Check if migration already applied
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM migrations WHERE name = ?)",
        [name],
        |row| row.get(0),
    )?;

    if !exists {
        tracing::info!("Running migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
    }

    Ok(())
}

const CREATE_STOCK_PRICES_TABLE: &str = r#"
CREATE TABLE stock_prices (
    ticker TEXT NOT NULL,
    date TEXT NOT NULL,
    open REAL NOT NULL,
    high REAL NOT NULL,
    low REAL NOT NULL,
    close REAL NOT NULL,
    volume INTEGER NOT NULL,
    PRIMARY KEY (ticker, date)
);

CREATE INDEX idx_stock_prices_date ON stock_prices(date);
"#;

const CREATE_STOCK_SECTOR_TABLE: &str = r#"
CREATE TABLE stock_sector (
    ticker TEXT PRIMARY KEY,
    sector TEXT NOT NULL
);
"#;

const CREATE_PORTFOLIO_HOLDINGS_TABLE: &str = r#"
CREATE TABLE portfolio_holdings (
    ticker TEXT PRIMARY KEY,
    shares REAL NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
