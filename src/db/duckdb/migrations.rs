//! DuckDB migrations

use super::Namespace;
use crate::error::Result;
use duckdb::Connection;

/// Run all DuckDB migrations
pub fn run_migrations(conn: &Connection, namespace: &Namespace) -> Result<()> {
    if let Some(schema) = namespace.schema.as_deref() {
        conn.execute_batch(&format!("CREATE SCHEMA IF NOT EXISTS {}", schema))?;
    }

    // Migrations tracking table (name is the primary key since we don't
    // need auto-increment)
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS migrations (
            name VARCHAR PRIMARY KEY,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
    )?;

    run_migration(conn, "001_stock_prices", &create_stock_prices(namespace))?;
    run_migration(conn, "002_stock_sector", &create_stock_sector(namespace))?;

    tracing::info!("DuckDB migrations completed");
    Ok(())
}

fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM migrations WHERE name = ?",
        [name],
        |row| row.get(0),
    )?;

    if !exists {
        tracing::info!("Running DuckDB migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
    }

    Ok(())
}

fn create_stock_prices(namespace: &Namespace) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {table} (
    ticker VARCHAR NOT NULL,
    date DATE NOT NULL,
    open DOUBLE NOT NULL,
    high DOUBLE NOT NULL,
    low DOUBLE NOT NULL,
    close DOUBLE NOT NULL,
    volume BIGINT NOT NULL,
    PRIMARY KEY (ticker, date)
);

CREATE INDEX IF NOT EXISTS idx_stock_prices_date ON {table}(date);
"#,
        table = namespace.prices()
    )
}

fn create_stock_sector(namespace: &Namespace) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {table} (
    ticker VARCHAR PRIMARY KEY,
    sector VARCHAR NOT NULL
);
"#,
        table = namespace.sectors()
    )
}
