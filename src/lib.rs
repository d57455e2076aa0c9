//! Quote Chart - OHLCV chart viewer written in Rust
//!
//! This crate provides:
//!
//! - Bar data model and display modes
//! - Quote history datafeeds (JSON file, HTTP)
//! - Chart lifecycle management over a pluggable charting backend
//! - An egui chart backend and desktop viewer (with `gui` feature)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use quote_chart::trader::{create_datafeed, fetch_series, HistoryRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let datafeed = create_datafeed();
//!     let bars = fetch_series(datafeed.as_ref(), &HistoryRequest::new("TCS.NS")).await;
//!     println!("{} bars", bars.len());
//! }
//! ```

pub mod chart;
pub mod trader;

// Re-export commonly used types
pub use chart::{Attach, ChartView, NotReady, UseChart};
pub use trader::{Bar, ChartError, DatafeedError, DisplayMode, HistoryRequest};

#[cfg(feature = "gui")]
pub use chart::{ChartPane, EguiChartLibrary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
