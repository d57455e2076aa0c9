//! Base constants and utility functions for the chart module.

use chrono::{DateTime, Datelike, Timelike, Utc};

// Chart colors
pub const BACKGROUND_COLOR: &str = "#000000";
pub const TEXT_COLOR: &str = "#eeeeee";
pub const GRID_COLOR: &str = "#333333";
pub const LINE_COLOR: &str = "#2196f3";
pub const VOLUME_COLOR: &str = "#26a69a";

// Candle colors
pub const UP_COLOR: &str = "#26a69a";
pub const DOWN_COLOR: &str = "#ef5350";

// Chart dimensions
pub const CHART_HEIGHT: f32 = 400.0;
pub const BAR_SPACING: f32 = 5.0;
pub const LINE_WIDTH: f32 = 2.0;

// Layout constants
pub const AXIS_X_HEIGHT: f32 = 28.0;
pub const AXIS_Y_WIDTH: f32 = 64.0;

/// Granularity of a time axis label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickMarkType {
    Year,
    Month,
    DayOfMonth,
    Time,
    TimeWithSeconds,
}

fn to_datetime(time: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time, 0)
}

/// Crosshair label for a bar time, e.g. `09:30:00 AM`
pub fn format_crosshair_time(time: i64) -> String {
    to_datetime(time)
        .map(|dt| dt.format("%I:%M:%S %p").to_string())
        .unwrap_or_default()
}

/// Time axis label for a bar time
pub fn format_tick_mark(time: i64, tick_type: TickMarkType) -> String {
    let Some(dt) = to_datetime(time) else {
        return String::new();
    };
    let pattern = match tick_type {
        TickMarkType::Year => "%Y",
        TickMarkType::Month => "%B %Y",
        TickMarkType::DayOfMonth => "%B %d, %Y",
        TickMarkType::Time => "%I:%M %p",
        TickMarkType::TimeWithSeconds => "%I:%M:%S %p",
    };
    dt.format(pattern).to_string()
}

/// Pick the label granularity for `time` given the previous label's time.
///
/// The coarsest unit that changed wins; the first label is always a date.
pub fn tick_mark_type(prev: Option<i64>, time: i64) -> TickMarkType {
    let (Some(current), Some(prev)) = (to_datetime(time), prev.and_then(to_datetime)) else {
        return TickMarkType::DayOfMonth;
    };

    if current.year() != prev.year() {
        TickMarkType::Year
    } else if current.month() != prev.month() {
        TickMarkType::Month
    } else if current.day() != prev.day() {
        TickMarkType::DayOfMonth
    } else if current.second() != 0 {
        TickMarkType::TimeWithSeconds
    } else {
        TickMarkType::Time
    }
}

/// Format price with appropriate precision
pub fn format_price(price: f64, decimals: usize) -> String {
    format!("{:.prec$}", price, prec = decimals)
}

/// Format volume with appropriate units (K, M, B)
pub fn format_volume(volume: f64) -> String {
    if volume >= 1_000_000_000.0 {
        format!("{:.2}B", volume / 1_000_000_000.0)
    } else if volume >= 1_000_000.0 {
        format!("{:.2}M", volume / 1_000_000.0)
    } else if volume >= 1_000.0 {
        format!("{:.2}K", volume / 1_000.0)
    } else {
        format!("{:.2}", volume)
    }
}

/// Calculate nice axis tick values
pub fn calculate_axis_ticks(min_val: f64, max_val: f64, max_ticks: usize) -> Vec<f64> {
    if min_val >= max_val || max_ticks == 0 {
        return vec![min_val];
    }

    let range = max_val - min_val;
    let rough_step = range / max_ticks as f64;

    let magnitude = 10.0_f64.powf(rough_step.log10().floor());
    let residual = rough_step / magnitude;

    let nice_step = if residual <= 1.5 {
        magnitude
    } else if residual <= 3.0 {
        2.0 * magnitude
    } else if residual <= 7.0 {
        5.0 * magnitude
    } else {
        10.0 * magnitude
    };

    // At most 2 * max_ticks + 1 ticks, even when the step is below float precision
    let first = (min_val / nice_step).ceil() * nice_step;
    (0..=max_ticks * 2)
        .map(|i| first + i as f64 * nice_step)
        .take_while(|value| *value <= max_val)
        .collect()
}
