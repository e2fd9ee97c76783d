//! REST API request and response types

use serde::{Deserialize, Serialize};

/// Uniform response envelope for every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Marker for responses that carry no payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Empty {}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(message: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: Some(message.to_string()),
            data: None,
        }
    }
}

/// Query parameters for period-bounded chart endpoints
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    /// Dashboard period label, e.g. "1 month"; defaults to "max"
    pub period: Option<String>,
}

/// Query parameters for the volume chart endpoint
#[derive(Debug, Deserialize)]
pub struct VolumeQuery {
    pub period: Option<String>,
    /// Volume bucket label, e.g. "very_high"; defaults to "all"
    pub bucket: Option<String>,
}

/// Query parameters for endpoints taking a comma-separated ticker list
#[derive(Debug, Deserialize)]
pub struct TickersQuery {
    pub tickers: String,
    pub period: Option<String>,
}

impl TickersQuery {
    /// Split and trim the comma-separated ticker list
    pub fn ticker_list(&self) -> Vec<String> {
        self.tickers
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Body for creating a holding
#[derive(Debug, Deserialize)]
pub struct HoldingRequest {
    pub ticker: String,
    pub shares: f64,
}

/// Body for editing a holding's share count
#[derive(Debug, Deserialize)]
pub struct SharesRequest {
    pub shares: f64,
}
