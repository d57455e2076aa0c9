//! Data manager for one painted series.
//!
//! Answers the range queries the painter needs: which points are on screen
//! and what value span they cover.

use std::collections::HashMap;

use super::api::{SeriesData, TimeScaleOptions, VisibleRange};

/// Manages the data of one painted series
pub struct BarManager {
    data: Option<SeriesData>,
    /// Cached value ranges
    value_ranges: HashMap<(usize, usize), (f64, f64)>,
}

impl Default for BarManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BarManager {
    pub fn new() -> Self {
        Self {
            data: None,
            value_ranges: HashMap::new(),
        }
    }

    /// Replace the managed data
    pub fn update_history(&mut self, data: SeriesData) {
        self.data = Some(data);
        self.value_ranges.clear();
    }

    pub fn data(&self) -> Option<&SeriesData> {
        self.data.as_ref()
    }

    /// Get total number of points
    pub fn get_count(&self) -> usize {
        self.data.as_ref().map_or(0, SeriesData::len)
    }

    /// Get bar time for an index
    pub fn get_time(&self, ix: usize) -> Option<i64> {
        self.data.as_ref()?.time_at(ix)
    }

    /// Min and max value for the inclusive index range.
    ///
    /// Candles span low to high; lines span their values. Degenerate spans
    /// are widened so the painter never divides by zero.
    pub fn get_value_range(&mut self, min_ix: usize, max_ix: usize) -> (f64, f64) {
        if let Some(&range) = self.value_ranges.get(&(min_ix, max_ix)) {
            return range;
        }

        let count = self.get_count();
        if count == 0 || min_ix > max_ix || min_ix >= count {
            return (0.0, 1.0);
        }
        let max_ix = max_ix.min(count - 1);

        let (mut low, mut high) = (f64::INFINITY, f64::NEG_INFINITY);
        match &self.data {
            Some(SeriesData::Candlestick(bars)) => {
                for bar in &bars[min_ix..=max_ix] {
                    low = low.min(bar.low);
                    high = high.max(bar.high);
                }
            }
            Some(SeriesData::Line(points)) => {
                for point in &points[min_ix..=max_ix] {
                    low = low.min(point.value);
                    high = high.max(point.value);
                }
            }
            None => return (0.0, 1.0),
        }

        let range = if !low.is_finite() || !high.is_finite() {
            (0.0, 1.0)
        } else if low == high {
            (low - 1.0, high + 1.0)
        } else {
            (low, high)
        };
        self.value_ranges.insert((min_ix, max_ix), range);
        range
    }

    /// Inclusive index window to draw in `width` pixels.
    ///
    /// Starts from the points inside `range`; when they need more room than
    /// the bar spacing allows, the newest ones are kept.
    pub fn visible_window(
        &self,
        range: Option<VisibleRange>,
        time_scale: &TimeScaleOptions,
        width: f32,
    ) -> Option<(usize, usize)> {
        let data = self.data.as_ref()?;
        if data.is_empty() {
            return None;
        }

        let (mut min_ix, mut max_ix) = (0, data.len() - 1);
        if let Some(range) = range {
            let inside: Vec<usize> = (0..data.len())
                .filter(|&ix| {
                    data.time_at(ix)
                        .is_some_and(|time| time >= range.from && time <= range.to)
                })
                .collect();
            let (Some(&first), Some(&last)) = (inside.first(), inside.last()) else {
                return None;
            };
            min_ix = first;
            max_ix = last;
        }

        if time_scale.bar_spacing > 0.0 && width > 0.0 {
            let capacity = ((width / time_scale.bar_spacing).floor() as usize).max(1);
            let shown = max_ix - min_ix + 1;
            if shown > capacity {
                min_ix = max_ix + 1 - capacity;
            }
        }

        Some((min_ix, max_ix))
    }

    /// Clear all data
    pub fn clear_all(&mut self) {
        self.data = None;
        self.value_ranges.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trader::{Bar, LineData};
    use std::sync::Arc;

    fn candles() -> SeriesData {
        SeriesData::Candlestick(Arc::from(vec![
            Bar::new(60, 100.0, 105.0, 95.0, 102.0, Some(1000.0)),
            Bar::new(120, 102.0, 110.0, 98.0, 108.0, Some(1500.0)),
            Bar::new(180, 108.0, 109.0, 101.0, 103.0, None),
        ]))
    }

    #[test]
    fn test_update_history() {
        let mut manager = BarManager::new();
        manager.update_history(candles());

        assert_eq!(manager.get_count(), 3);
        assert_eq!(manager.get_time(2), Some(180));
        assert_eq!(manager.get_time(3), None);
    }

    #[test]
    fn test_value_range_candles() {
        let mut manager = BarManager::new();
        manager.update_history(candles());

        assert_eq!(manager.get_value_range(0, 2), (95.0, 110.0));
        assert_eq!(manager.get_value_range(2, 2), (101.0, 109.0));
    }

    #[test]
    fn test_value_range_flat_line_is_widened() {
        let mut manager = BarManager::new();
        manager.update_history(SeriesData::Line(vec![
            LineData::new(1, 5.0),
            LineData::new(2, 5.0),
        ]));
        assert_eq!(manager.get_value_range(0, 1), (4.0, 6.0));
    }

    #[test]
    fn test_visible_window_clips_to_range() {
        let mut manager = BarManager::new();
        manager.update_history(candles());
        let time_scale = TimeScaleOptions::default();

        let range = VisibleRange { from: 100, to: 200 };
        assert_eq!(
            manager.visible_window(Some(range), &time_scale, 800.0),
            Some((1, 2))
        );
        assert_eq!(manager.visible_window(None, &time_scale, 800.0), Some((0, 2)));

        let outside = VisibleRange { from: 500, to: 600 };
        assert_eq!(manager.visible_window(Some(outside), &time_scale, 800.0), None);
    }

    #[test]
    fn test_visible_window_keeps_newest_when_narrow() {
        let mut manager = BarManager::new();
        manager.update_history(candles());
        let time_scale = TimeScaleOptions::default();

        // 10px at 5px per bar fits two bars
        assert_eq!(manager.visible_window(None, &time_scale, 10.0), Some((1, 2)));
    }

    #[test]
    fn test_clear_all() {
        let mut manager = BarManager::new();
        manager.update_history(candles());
        manager.clear_all();
        assert_eq!(manager.get_count(), 0);
        assert_eq!(manager.visible_window(None, &TimeScaleOptions::default(), 800.0), None);
    }
}
