//! Datafeed module for loading quote history.
//!
//! The chart never talks to a datafeed directly: callers fetch a series with
//! [`fetch_series`] and hand the result to the chart view, with any failure
//! already turned into an empty series.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, COOKIE};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::constant::DEFAULT_INTERVAL;
use super::error::DatafeedError;
use super::object::{Bar, HistoryRequest};
use super::setting::{Settings, SETTINGS};

/// Quote history provider
#[async_trait]
pub trait QuoteDatafeed: Send + Sync {
    /// Datafeed name for logging
    fn name(&self) -> &str;

    /// Query history bar data, ordered by ascending time
    async fn query_bar_history(&self, req: &HistoryRequest) -> Result<Vec<Bar>, DatafeedError>;
}

/// Query a datafeed and fall back to an empty series on failure.
pub async fn fetch_series(datafeed: &dyn QuoteDatafeed, req: &HistoryRequest) -> Arc<[Bar]> {
    match datafeed.query_bar_history(req).await {
        Ok(bars) => {
            tracing::debug!(
                datafeed = datafeed.name(),
                ticker = %req.ticker,
                bars = bars.len(),
                "history loaded"
            );
            Arc::from(bars)
        }
        Err(e) => {
            tracing::warn!(
                datafeed = datafeed.name(),
                ticker = %req.ticker,
                "history query failed: {}",
                e
            );
            Arc::from(Vec::new())
        }
    }
}

/// Datafeed used when nothing is configured
#[derive(Debug, Default)]
pub struct EmptyDatafeed;

impl EmptyDatafeed {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QuoteDatafeed for EmptyDatafeed {
    fn name(&self) -> &str {
        "empty"
    }

    async fn query_bar_history(&self, _req: &HistoryRequest) -> Result<Vec<Bar>, DatafeedError> {
        Err(DatafeedError::NotConfigured)
    }
}

/// Reads a JSON document mapping tickers to bar arrays.
///
/// The file is read on every query so edits show up on the next fetch.
#[derive(Debug, Clone)]
pub struct JsonFileDatafeed {
    path: PathBuf,
}

impl JsonFileDatafeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl QuoteDatafeed for JsonFileDatafeed {
    fn name(&self) -> &str {
        "json"
    }

    async fn query_bar_history(&self, req: &HistoryRequest) -> Result<Vec<Bar>, DatafeedError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let mut document: HashMap<String, Vec<Bar>> = serde_json::from_str(&content)?;

        // Unknown tickers read as an empty series
        let bars = document.remove(&req.ticker).unwrap_or_default();
        Ok(bars.into_iter().filter(|bar| req.contains(bar)).collect())
    }
}

/// Timeout for one history request
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for the quote history backend.
pub struct HttpDatafeed {
    client: reqwest::Client,
    base_url: Url,
    cookie: Option<String>,
    authorization: Option<String>,
}

impl HttpDatafeed {
    /// Create a datafeed for the backend at `base_url`
    pub fn new(base_url: &str) -> Result<Self, DatafeedError> {
        let base_url =
            Url::parse(base_url).map_err(|_| DatafeedError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(DatafeedError::InvalidUrl(base_url.to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url,
            cookie: None,
            authorization: None,
        })
    }

    /// Forward a cookie header with every request
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    /// Forward an authorization header with every request
    pub fn with_authorization(mut self, authorization: impl Into<String>) -> Self {
        self.authorization = Some(authorization.into());
        self
    }

    /// Build `{base}/quote/history/{ticker}?start=..&end=..&interval=..`
    pub fn history_url(&self, req: &HistoryRequest) -> Result<Url, DatafeedError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DatafeedError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["quote", "history", req.ticker.as_str()]);

        {
            let mut query = url.query_pairs_mut();
            if let Some(start) = req.start {
                query.append_pair("start", &start.format("%Y-%m-%d").to_string());
            }
            if let Some(end) = req.end {
                query.append_pair("end", &end.format("%Y-%m-%d").to_string());
            }
            query.append_pair("interval", req.interval.as_deref().unwrap_or(DEFAULT_INTERVAL));
        }

        Ok(url)
    }
}

#[async_trait]
impl QuoteDatafeed for HttpDatafeed {
    fn name(&self) -> &str {
        "http"
    }

    async fn query_bar_history(&self, req: &HistoryRequest) -> Result<Vec<Bar>, DatafeedError> {
        let url = self.history_url(req)?;
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url);
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }
        if let Some(authorization) = &self.authorization {
            request = request.header(AUTHORIZATION, authorization);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DatafeedError::Status {
                ticker: req.ticker.clone(),
                status: status.as_u16(),
            });
        }

        Ok(response.json::<Vec<Bar>>().await?)
    }
}

/// Create the datafeed selected by `datafeed.name` in the global settings
pub fn create_datafeed() -> Arc<dyn QuoteDatafeed> {
    create_datafeed_from(&SETTINGS)
}

/// Create the datafeed selected by `datafeed.name` in `settings`
pub fn create_datafeed_from(settings: &Settings) -> Arc<dyn QuoteDatafeed> {
    let name = settings.get_string("datafeed.name").unwrap_or_default();
    match name.as_str() {
        "json" => {
            let path = settings
                .get_non_empty("datafeed.path")
                .unwrap_or_else(|| "ohlcv.json".to_string());
            Arc::new(JsonFileDatafeed::new(path))
        }
        "http" => {
            let Some(url) = settings.get_non_empty("datafeed.url") else {
                tracing::warn!("datafeed.url is not set, falling back to the empty datafeed");
                return Arc::new(EmptyDatafeed::new());
            };
            match HttpDatafeed::new(&url) {
                Ok(mut datafeed) => {
                    if let Some(cookie) = settings.get_non_empty("datafeed.cookie") {
                        datafeed = datafeed.with_cookie(cookie);
                    }
                    if let Some(authorization) = settings.get_non_empty("datafeed.authorization") {
                        datafeed = datafeed.with_authorization(authorization);
                    }
                    Arc::new(datafeed)
                }
                Err(e) => {
                    tracing::warn!("{}, falling back to the empty datafeed", e);
                    Arc::new(EmptyDatafeed::new())
                }
            }
        }
        other => {
            tracing::warn!("unknown datafeed '{}', no quote history will load", other);
            Arc::new(EmptyDatafeed::new())
        }
    }
}

/// Interval configured by `datafeed.interval`, defaulting to 5 minutes.
///
/// Any value is passed through; the backend decides what it accepts.
pub fn configured_interval(settings: &Settings) -> String {
    settings
        .get_non_empty("datafeed.interval")
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_INTERVAL.to_string())
}
