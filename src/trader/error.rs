//! Error types.

use thiserror::Error;

/// Failures reported by a chart backend.
#[derive(Debug, Error)]
pub enum ChartError {
    /// The chart instance was already removed
    #[error("chart has been disposed")]
    Disposed,

    #[error("unknown series id {0}")]
    UnknownSeries(u32),

    /// Series data does not match the renderer it was given to
    #[error("{data} data cannot be set on a {series} series")]
    SeriesKindMismatch {
        series: &'static str,
        data: &'static str,
    },

    #[error("chart backend error: {0}")]
    Backend(String),
}

/// Failures while querying the quote history provider.
#[derive(Debug, Error)]
pub enum DatafeedError {
    #[error("no datafeed configured")]
    NotConfigured,

    #[error("invalid datafeed url: {0}")]
    InvalidUrl(String),

    #[error("failed to read quote file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode quote data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("failed to fetch data for {ticker}: status {status}")]
    Status { ticker: String, status: u16 },
}
