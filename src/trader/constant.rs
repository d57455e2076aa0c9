//! Constants shared by the chart view and the quote datafeed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a series of bars is projected onto the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// OHLC candles, one per bar
    #[default]
    Candlestick,
    /// Close price line
    Line,
    /// Volume line
    Volume,
}

impl DisplayMode {
    /// Get mode value string
    pub fn value(&self) -> &'static str {
        match self {
            DisplayMode::Candlestick => "candlestick",
            DisplayMode::Line => "line",
            DisplayMode::Volume => "volume",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            DisplayMode::Candlestick => "Candlestick",
            DisplayMode::Line => "Line",
            DisplayMode::Volume => "Volume",
        }
    }

    /// Get all modes for UI selection
    pub fn all() -> Vec<DisplayMode> {
        vec![DisplayMode::Candlestick, DisplayMode::Line, DisplayMode::Volume]
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "candlestick" => Ok(DisplayMode::Candlestick),
            "line" => Ok(DisplayMode::Line),
            "volume" => Ok(DisplayMode::Volume),
            other => Err(format!("unknown display mode: {}", other)),
        }
    }
}

/// Interval sent when a history request names none.
///
/// Intervals are passed to the history backend as-is (`1m`, `30m`, `1d`,
/// `1mo`, ...), so they stay plain strings.
pub const DEFAULT_INTERVAL: &str = "5m";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mode_parse() {
        for mode in DisplayMode::all() {
            assert_eq!(mode.value().parse::<DisplayMode>(), Ok(mode));
        }
        assert!("area".parse::<DisplayMode>().is_err());
    }

    #[test]
    fn test_display_mode_serde() {
        let json = serde_json::to_string(&DisplayMode::Volume).unwrap();
        assert_eq!(json, "\"volume\"");
    }
}
