//! Projections of a bar series onto the renderer each display mode uses.

use std::sync::Arc;

use super::api::{SeriesData, SeriesOptions, VisibleRange};
use super::base::{LINE_COLOR, VOLUME_COLOR};
use crate::trader::{Bar, DisplayMode, LineData};

/// Renderer options for a display mode
pub fn series_options(mode: DisplayMode) -> SeriesOptions {
    match mode {
        DisplayMode::Candlestick => SeriesOptions::candlestick(),
        DisplayMode::Line => SeriesOptions::line(LINE_COLOR),
        DisplayMode::Volume => SeriesOptions::line(VOLUME_COLOR),
    }
}

/// Project bars into the data the mode's renderer takes
pub fn project(series: &Arc<[Bar]>, mode: DisplayMode) -> SeriesData {
    match mode {
        DisplayMode::Candlestick => SeriesData::Candlestick(Arc::clone(series)),
        DisplayMode::Line => SeriesData::Line(
            series
                .iter()
                .map(|bar| LineData::new(bar.time, bar.close))
                .collect(),
        ),
        DisplayMode::Volume => SeriesData::Line(
            series
                .iter()
                .map(|bar| LineData::new(bar.time, bar.volume_or_zero()))
                .collect(),
        ),
    }
}

/// First to last bar time, without padding; `None` for an empty series
pub fn visible_range(series: &[Bar]) -> Option<VisibleRange> {
    let first = series.first()?;
    let last = series.last()?;
    Some(VisibleRange {
        from: first.time,
        to: last.time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::api::SeriesKind;

    fn sample() -> Arc<[Bar]> {
        Arc::from(vec![
            Bar::new(1, 10.0, 12.0, 9.0, 11.0, Some(100.0)),
            Bar::new(2, 11.0, 13.0, 10.0, 12.0, Some(150.0)),
        ])
    }

    #[test]
    fn test_line_projects_close() {
        let data = project(&sample(), DisplayMode::Line);
        assert_eq!(
            data,
            SeriesData::Line(vec![LineData::new(1, 11.0), LineData::new(2, 12.0)])
        );
    }

    #[test]
    fn test_volume_projects_volume() {
        let data = project(&sample(), DisplayMode::Volume);
        assert_eq!(
            data,
            SeriesData::Line(vec![LineData::new(1, 100.0), LineData::new(2, 150.0)])
        );
    }

    #[test]
    fn test_missing_volume_is_zero() {
        let series: Arc<[Bar]> = Arc::from(vec![Bar::new(7, 1.0, 1.0, 1.0, 1.0, None)]);
        let data = project(&series, DisplayMode::Volume);
        assert_eq!(data, SeriesData::Line(vec![LineData::new(7, 0.0)]));
    }

    #[test]
    fn test_candlestick_shares_bars() {
        let series = sample();
        match project(&series, DisplayMode::Candlestick) {
            SeriesData::Candlestick(bars) => assert!(Arc::ptr_eq(&bars, &series)),
            other => panic!("unexpected projection {:?}", other),
        }
    }

    #[test]
    fn test_series_options_per_mode() {
        assert_eq!(series_options(DisplayMode::Candlestick).kind, SeriesKind::Candlestick);
        assert_eq!(series_options(DisplayMode::Line).color.as_deref(), Some(LINE_COLOR));
        assert_eq!(series_options(DisplayMode::Volume).color.as_deref(), Some(VOLUME_COLOR));
    }

    #[test]
    fn test_visible_range() {
        assert_eq!(visible_range(&sample()), Some(VisibleRange { from: 1, to: 2 }));
        assert_eq!(visible_range(&sample()[..1]), Some(VisibleRange { from: 1, to: 1 }));
        assert_eq!(visible_range(&[]), None);
    }
}
