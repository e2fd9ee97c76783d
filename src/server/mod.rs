//! HTTP server for the dashboard API
//!
//! Serves the tabular contracts the browser charts render. CORS is open
//! for local development; request traces go through `tower_http`.

pub mod handlers;
pub mod types;

use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Build the API router
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/", get(handlers::health_check))
        // Market data
        .route("/api/v1/tickers", get(handlers::get_tickers))
        .route("/api/v1/prices/:ticker", get(handlers::get_prices))
        .route("/api/v1/volume/:ticker", get(handlers::get_volume))
        .route("/api/v1/correlation", get(handlers::get_correlation))
        .route("/api/v1/latest-prices", get(handlers::get_latest_prices))
        // Portfolio
        .route("/api/v1/portfolio", get(handlers::list_portfolio))
        .route("/api/v1/portfolio", post(handlers::add_holding))
        .route("/api/v1/portfolio/sectors", get(handlers::get_sector_breakdown))
        .route("/api/v1/portfolio/:ticker", put(handlers::edit_holding))
        .route("/api/v1/portfolio/:ticker", delete(handlers::delete_holding))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Dashboard API server
pub struct ApiServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Create a new server
    pub fn new() -> Self {
        Self { shutdown_tx: None }
    }

    /// Start the server
    pub async fn start(&mut self, state: Arc<AppState>) -> Result<()> {
        let host = state.config.host.clone();
        let port = state.config.port;

        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid bind address: {}", e)))?;

        let app = build_router(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        info!("Starting stockdash API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("API server shutting down");
            });

            if let Err(e) = server.await {
                error!("API server error: {}", e);
            }
        });

        info!("Market data:   GET http://{}:{}/api/v1/tickers", host, port);
        info!("               GET http://{}:{}/api/v1/prices/{{ticker}}", host, port);
        info!("               GET http://{}:{}/api/v1/volume/{{ticker}}", host, port);
        info!("               GET http://{}:{}/api/v1/correlation", host, port);
        info!("               GET http://{}:{}/api/v1/latest-prices", host, port);
        info!("Portfolio:     GET http://{}:{}/api/v1/portfolio", host, port);
        info!("               GET http://{}:{}/api/v1/portfolio/sectors", host, port);

        Ok(())
    }

    /// Stop the server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            info!("API server stop signal sent");
        }
    }

    /// Check if server is running
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }
}

impl Default for ApiServer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}
