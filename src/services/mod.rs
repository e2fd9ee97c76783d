//! Business logic services
//!
//! Services sit between the HTTP handlers and the storage layer and own
//! the dashboard's fail-soft contract: chart and lookup operations never
//! surface an error, they log the cause and degrade to the
//! type-appropriate empty value.

pub mod market_service;
pub mod portfolio_service;

pub use market_service::MarketService;
pub use portfolio_service::PortfolioService;
