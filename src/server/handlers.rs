//! REST API endpoint handlers
//!
//! Chart and lookup endpoints always answer 200 with possibly-empty data;
//! the browser renders an empty-chart placeholder for empty tables.
//! Portfolio mutations surface validation failures as error responses.

use crate::analytics::CorrelationMatrix;
use crate::db::sqlite::Holding;
use crate::db::{OhlcRow, VolumeRow};
use crate::error::Result;
use crate::filters::{Period, VolumeBucket};
use crate::server::types::*;
use crate::services::{MarketService, PortfolioService};
use crate::services::portfolio_service::{SectorTotal, ValuedHolding};
use crate::state::AppState;
use axum::extract::{Json, Path, Query, State};
use axum::response::IntoResponse;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

// ============================================================================
// Health Check
// ============================================================================

/// Health check endpoint - GET /health or GET /
pub async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::<Empty>::success_with_message(
        "stockdash API is running",
    ))
}

// ============================================================================
// Market Data
// ============================================================================

/// GET /api/v1/tickers
pub async fn get_tickers(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<String>>> {
    let tickers = MarketService::tickers(state.market.as_ref());
    Json(ApiResponse::success(tickers))
}

/// GET /api/v1/prices/:ticker?period=
pub async fn get_prices(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Json<ApiResponse<Vec<OhlcRow>>> {
    let period = query.period.as_deref().map(Period::parse).unwrap_or_default();
    let rows = MarketService::price_history(state.market.as_ref(), &ticker, period);
    Json(ApiResponse::success(rows))
}

/// GET /api/v1/volume/:ticker?period=&bucket=
pub async fn get_volume(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<VolumeQuery>,
) -> Json<ApiResponse<Vec<VolumeRow>>> {
    let period = query.period.as_deref().map(Period::parse).unwrap_or_default();
    let bucket = query
        .bucket
        .as_deref()
        .map(VolumeBucket::parse)
        .unwrap_or_default();
    let rows = MarketService::volume_history(state.market.as_ref(), &ticker, period, bucket);
    Json(ApiResponse::success(rows))
}

/// GET /api/v1/correlation?tickers=A,B&period=
pub async fn get_correlation(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TickersQuery>,
) -> Json<ApiResponse<CorrelationMatrix>> {
    let period = query.period.as_deref().map(Period::parse).unwrap_or_default();
    let tickers = query.ticker_list();
    let matrix = MarketService::correlation(state.market.as_ref(), &tickers, period);
    Json(ApiResponse::success(matrix))
}

/// GET /api/v1/latest-prices?tickers=A,B
pub async fn get_latest_prices(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TickersQuery>,
) -> Json<ApiResponse<HashMap<String, f64>>> {
    let tickers = query.ticker_list();
    let prices = MarketService::latest_prices(state.market.as_ref(), &tickers);
    Json(ApiResponse::success(prices))
}

// ============================================================================
// Portfolio
// ============================================================================

/// GET /api/v1/portfolio
pub async fn list_portfolio(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<ValuedHolding>>> {
    let holdings = PortfolioService::valued_holdings(&state.portfolio, state.market.as_ref());
    Json(ApiResponse::success(holdings))
}

/// POST /api/v1/portfolio
pub async fn add_holding(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HoldingRequest>,
) -> Result<Json<ApiResponse<Holding>>> {
    let holding = PortfolioService::add_holding(&state.portfolio, &req.ticker, req.shares)?;
    info!("Holding saved: {}", holding.ticker);
    Ok(Json(ApiResponse::success(holding)))
}

/// PUT /api/v1/portfolio/:ticker
pub async fn edit_holding(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Json(req): Json<SharesRequest>,
) -> Result<Json<ApiResponse<Holding>>> {
    let holding = PortfolioService::edit_holding(&state.portfolio, &ticker, req.shares)?;
    Ok(Json(ApiResponse::success(holding)))
}

/// DELETE /api/v1/portfolio/:ticker
pub async fn delete_holding(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<ApiResponse<Empty>>> {
    PortfolioService::remove_holding(&state.portfolio, &ticker)?;
    info!("Holding deleted: {}", ticker);
    Ok(Json(ApiResponse::success_with_message("Holding deleted")))
}

/// GET /api/v1/portfolio/sectors
pub async fn get_sector_breakdown(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<SectorTotal>>> {
    let totals = PortfolioService::sector_breakdown(&state.portfolio, state.market.as_ref());
    Json(ApiResponse::success(totals))
}
