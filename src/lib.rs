//! stockdash - Stock Market Analytics Dashboard Backend
//!
//! Turns raw time-series price rows into chart-ready tabular structures
//! (price history, volume history, correlation matrices, sector-aggregated
//! portfolio value) over two interchangeable storage backends, and serves
//! them to the browser as JSON.

pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod server;
pub mod services;
pub mod state;
