//! Chart module for rendering a bar series as candlesticks, a close line or volume.
//!
//! This module provides:
//! - `ChartView` - Chart lifecycle: one live chart per container
//! - `UseChart` - Rebuilds the chart when the series or mode changes
//! - `ChartApi` / `ChartLibrary` / `Container` - Backend interface
//! - `BarManager` - Time-indexed series data for painting
//! - `EguiChartLibrary` / `ChartPane` - Backend painted with egui (`gui` feature)
//!
//! # Example
//!
//! ```ignore
//! use quote_chart::chart::{ChartPane, EguiChartLibrary, UseChart};
//! use quote_chart::trader::DisplayMode;
//!
//! let pane = ChartPane::new();
//! let mut chart = UseChart::new(EguiChartLibrary);
//! chart.run(&pane, &bars, DisplayMode::Candlestick)?;
//! ```

mod api;
mod base;
mod hook;
mod manager;
mod projection;
mod view;

#[cfg(feature = "gui")]
mod item;
#[cfg(feature = "gui")]
mod widget;

#[cfg(test)]
mod testing;

pub use api::{
    ChartApi, ChartLibrary, ChartOptions, Container, CrosshairMode, GridOptions, LayoutOptions,
    ObservedWidth, ResizeCallback, ResizeObserver, SeriesData, SeriesId, SeriesKind,
    SeriesOptions, SharedChart, TimeScaleOptions, VisibleRange,
};
pub use base::*;
pub use hook::UseChart;
pub use manager::BarManager;
pub use projection::{project, series_options, visible_range};
pub use view::{Attach, ChartView, NotReady};

#[cfg(feature = "gui")]
pub use item::{CandleItem, ChartItem, LineItem};
#[cfg(feature = "gui")]
pub use widget::{ChartPane, EguiChartLibrary, PaintedChart};
