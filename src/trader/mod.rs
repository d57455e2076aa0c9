//! Trader module - data model and services around the chart.
//!
//! - **constant**: DisplayMode and the default interval
//! - **object**: Bar, LineData and HistoryRequest
//! - **error**: Chart and datafeed error types
//! - **datafeed**: Quote history providers
//! - **setting**: Global settings management
//! - **logger**: Logging utilities
//! - **utility**: Utility functions

pub mod constant;
pub mod datafeed;
pub mod error;
pub mod logger;
pub mod object;
pub mod setting;
pub mod utility;

// Re-exports for convenience
pub use constant::{DisplayMode, DEFAULT_INTERVAL};
pub use datafeed::{
    create_datafeed, fetch_series, EmptyDatafeed, HttpDatafeed, JsonFileDatafeed, QuoteDatafeed,
};
pub use error::{ChartError, DatafeedError};
pub use logger::init_logger;
pub use object::{Bar, HistoryRequest, LineData};
pub use setting::{SettingValue, Settings, SETTINGS};
