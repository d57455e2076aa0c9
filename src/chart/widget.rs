//! Chart backend painted with egui.
//!
//! [`EguiChartLibrary`] creates [`PaintedChart`]s mounted into a
//! [`ChartPane`]. The pane tracks the width egui gives it each frame and
//! paints whatever charts are still mounted.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2};

use super::api::{
    ChartApi, ChartLibrary, ChartOptions, Container, ObservedWidth, ResizeCallback,
    ResizeObserver, SeriesData, SeriesId, SeriesOptions, SharedChart, TimeScaleOptions,
    VisibleRange,
};
use super::base::{
    calculate_axis_ticks, format_crosshair_time, format_price, format_tick_mark, format_volume,
    tick_mark_type, AXIS_X_HEIGHT, AXIS_Y_WIDTH,
};
use super::item::{item_for, parse_color, ChartItem, Viewport};
use super::manager::BarManager;
use crate::trader::ChartError;

/// Minimum pixels between two time axis labels
const LABEL_SPACING: f32 = 96.0;
const MAX_PRICE_TICKS: usize = 6;

struct PaintedSeries {
    id: SeriesId,
    options: SeriesOptions,
    manager: BarManager,
    item: Box<dyn ChartItem>,
}

/// A chart drawn with an egui painter
pub struct PaintedChart {
    options: ChartOptions,
    series: Vec<PaintedSeries>,
    visible_range: Option<VisibleRange>,
    time_scale: TimeScaleOptions,
    next_series_id: u32,
    removed: bool,
}

impl PaintedChart {
    pub fn new(options: ChartOptions) -> Self {
        Self {
            options,
            series: Vec::new(),
            visible_range: None,
            time_scale: TimeScaleOptions::default(),
            next_series_id: 0,
            removed: false,
        }
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    pub fn visible_range(&self) -> Option<VisibleRange> {
        self.visible_range
    }

    pub fn time_scale(&self) -> &TimeScaleOptions {
        &self.time_scale
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Data currently held by a series
    pub fn series_data(&self, id: SeriesId) -> Option<&SeriesData> {
        self.series
            .iter()
            .find(|series| series.id == id)
            .and_then(|series| series.manager.data())
    }

    fn ensure_live(&self) -> Result<(), ChartError> {
        if self.removed {
            Err(ChartError::Disposed)
        } else {
            Ok(())
        }
    }

    /// Paint the chart at its configured size
    pub fn paint(&mut self, ui: &mut Ui) {
        let size = Vec2::new(self.options.width, self.options.height);
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        let rect = response.rect;

        let background = parse_color(&self.options.layout.background, Color32::BLACK);
        let text_color = parse_color(&self.options.layout.text_color, Color32::LIGHT_GRAY);
        let grid_stroke = Stroke::new(
            1.0,
            parse_color(&self.options.grid.horz_lines, Color32::DARK_GRAY),
        );
        let font = FontId::monospace(11.0);
        painter.rect_filled(rect, 0.0, background);

        let axis_height = if self.options.time_visible {
            AXIS_X_HEIGHT
        } else {
            0.0
        };
        let plot = Rect::from_min_max(
            rect.min,
            Pos2::new(rect.right() - AXIS_Y_WIDTH, rect.bottom() - axis_height),
        );
        if plot.width() <= 0.0 || plot.height() <= 0.0 {
            return;
        }

        let Some(series) = self.series.first_mut() else {
            return;
        };
        let Some((min_ix, max_ix)) =
            series
                .manager
                .visible_window(self.visible_range, &self.time_scale, plot.width())
        else {
            return;
        };
        let (y_min, y_max) = series.manager.get_value_range(min_ix, max_ix);
        let viewport = Viewport {
            rect: plot,
            min_ix,
            max_ix,
            y_min,
            y_max,
        };

        // Price axis
        for value in calculate_axis_ticks(y_min, y_max, MAX_PRICE_TICKS) {
            let y = viewport.value_to_y(value);
            if y < plot.top() || y > plot.bottom() {
                continue;
            }
            painter.line_segment([Pos2::new(plot.left(), y), Pos2::new(plot.right(), y)], grid_stroke);
            painter.text(
                Pos2::new(plot.right() + 4.0, y),
                Align2::LEFT_CENTER,
                format_axis_value(value),
                font.clone(),
                text_color,
            );
        }

        // Time axis
        let label_step = ((LABEL_SPACING / viewport.bar_width()).ceil() as usize).max(1);
        let mut prev_time = None;
        for ix in (min_ix..=max_ix).step_by(label_step) {
            let Some(time) = series.manager.get_time(ix) else {
                continue;
            };
            let x = viewport.index_to_x(ix);
            painter.line_segment([Pos2::new(x, plot.top()), Pos2::new(x, plot.bottom())], grid_stroke);
            if self.options.time_visible {
                painter.text(
                    Pos2::new(x, plot.bottom() + 4.0),
                    Align2::CENTER_TOP,
                    format_tick_mark(time, tick_mark_type(prev_time, time)),
                    font.clone(),
                    text_color,
                );
            }
            prev_time = Some(time);
        }

        let Some(data) = series.manager.data() else {
            return;
        };
        series.item.draw(&painter, data, &viewport);

        // Crosshair
        let Some(pos) = response.hover_pos().filter(|pos| plot.contains(*pos)) else {
            return;
        };
        let ix = viewport.x_to_index(pos.x);
        let x = viewport.index_to_x(ix);
        let crosshair = Stroke::new(1.0, text_color.gamma_multiply(0.5));
        painter.line_segment([Pos2::new(x, plot.top()), Pos2::new(x, plot.bottom())], crosshair);
        painter.line_segment(
            [Pos2::new(plot.left(), pos.y), Pos2::new(plot.right(), pos.y)],
            crosshair,
        );

        if let Some(time) = series.manager.get_time(ix) {
            painter.text(
                Pos2::new(x, plot.bottom() + 4.0),
                Align2::CENTER_TOP,
                format_crosshair_time(time),
                font.clone(),
                text_color,
            );
        }
        painter.text(
            plot.left_top() + Vec2::new(6.0, 6.0),
            Align2::LEFT_TOP,
            series.item.info_text(data, ix),
            font,
            text_color,
        );
    }
}

/// Price labels switch to K/M/B units for large values such as volume
fn format_axis_value(value: f64) -> String {
    if value.abs() >= 100_000.0 {
        format_volume(value)
    } else {
        format_price(value, 2)
    }
}

impl ChartApi for PaintedChart {
    fn add_series(&mut self, options: SeriesOptions) -> Result<SeriesId, ChartError> {
        self.ensure_live()?;
        let id = SeriesId(self.next_series_id);
        self.next_series_id += 1;
        self.series.push(PaintedSeries {
            id,
            item: item_for(&options),
            options,
            manager: BarManager::new(),
        });
        Ok(id)
    }

    fn set_series_data(&mut self, series: SeriesId, data: SeriesData) -> Result<(), ChartError> {
        self.ensure_live()?;
        let entry = self
            .series
            .iter_mut()
            .find(|entry| entry.id == series)
            .ok_or(ChartError::UnknownSeries(series.0))?;
        if entry.options.kind != data.kind() {
            return Err(ChartError::SeriesKindMismatch {
                series: entry.options.kind.name(),
                data: data.kind().name(),
            });
        }
        entry.manager.update_history(data);
        Ok(())
    }

    fn set_visible_range(&mut self, range: VisibleRange) -> Result<(), ChartError> {
        self.ensure_live()?;
        if range.from > range.to {
            return Err(ChartError::Backend(format!(
                "visible range starts after it ends: {} > {}",
                range.from, range.to
            )));
        }
        self.visible_range = Some(range);
        Ok(())
    }

    fn apply_time_scale_options(&mut self, options: TimeScaleOptions) -> Result<(), ChartError> {
        self.ensure_live()?;
        self.time_scale = options;
        Ok(())
    }

    fn resize(&mut self, width: f32, height: f32) -> Result<(), ChartError> {
        self.ensure_live()?;
        self.options.width = width;
        self.options.height = height;
        Ok(())
    }

    fn remove(&mut self) -> Result<(), ChartError> {
        self.ensure_live()?;
        self.removed = true;
        for series in &mut self.series {
            series.manager.clear_all();
        }
        self.series.clear();
        Ok(())
    }

    fn is_removed(&self) -> bool {
        self.removed
    }
}

/// Area of the window charts are mounted into
#[derive(Default)]
pub struct ChartPane {
    width: ObservedWidth,
    charts: RefCell<Vec<Weak<RefCell<PaintedChart>>>>,
}

impl ChartPane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the width available in `ui`, notifying resize observers if it changed
    pub fn measure(&self, ui: &Ui) -> f32 {
        let width = ui.available_width();
        self.width.set(width);
        width
    }

    /// Returns whether the width changed
    pub fn set_width(&self, width: f32) -> bool {
        self.width.set(width)
    }

    fn mount(&self, chart: &Rc<RefCell<PaintedChart>>) {
        let mut charts = self.charts.borrow_mut();
        charts.retain(|chart| chart.strong_count() > 0);
        charts.push(Rc::downgrade(chart));
    }

    fn live_charts(&self) -> Vec<Rc<RefCell<PaintedChart>>> {
        let mut charts = self.charts.borrow_mut();
        charts.retain(|chart| {
            chart
                .upgrade()
                .is_some_and(|chart| chart.try_borrow().map_or(true, |c| !c.is_removed()))
        });
        charts.iter().filter_map(Weak::upgrade).collect()
    }

    /// Number of mounted charts that are still alive
    pub fn chart_count(&self) -> usize {
        self.live_charts().len()
    }

    /// Paint every mounted chart
    pub fn paint(&self, ui: &mut Ui) {
        for chart in self.live_charts() {
            if let Ok(mut chart) = chart.try_borrow_mut() {
                chart.paint(ui);
            }
        }
    }
}

impl Container for ChartPane {
    fn client_width(&self) -> f32 {
        self.width.get()
    }

    fn observe_resize(&self, callback: ResizeCallback) -> Box<dyn ResizeObserver> {
        self.width.observe(callback)
    }
}

/// Creates [`PaintedChart`]s
#[derive(Debug, Default)]
pub struct EguiChartLibrary;

impl ChartLibrary for EguiChartLibrary {
    type Container = ChartPane;

    fn create_chart(
        &mut self,
        container: &ChartPane,
        options: ChartOptions,
    ) -> Result<SharedChart, ChartError> {
        let chart = Rc::new(RefCell::new(PaintedChart::new(options)));
        container.mount(&chart);
        Ok(chart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::api::SeriesKind;
    use crate::chart::hook::UseChart;
    use crate::chart::testing::scenario_series;
    use crate::chart::view::Attach;
    use crate::trader::{DisplayMode, LineData};

    #[test]
    fn test_series_kind_is_checked() {
        let mut chart = PaintedChart::new(ChartOptions::new(800.0, 400.0));
        let id = chart.add_series(SeriesOptions::candlestick()).unwrap();

        let err = chart
            .set_series_data(id, SeriesData::Line(vec![LineData::new(1, 1.0)]))
            .unwrap_err();
        assert!(matches!(
            err,
            ChartError::SeriesKindMismatch {
                series: "candlestick",
                data: "line"
            }
        ));
        assert!(matches!(
            chart.set_series_data(SeriesId(9), SeriesData::Line(Vec::new())),
            Err(ChartError::UnknownSeries(9))
        ));
    }

    #[test]
    fn test_removed_chart_rejects_calls() {
        let mut chart = PaintedChart::new(ChartOptions::new(800.0, 400.0));
        chart.add_series(SeriesOptions::line("#2196f3")).unwrap();
        chart.remove().unwrap();

        assert!(chart.is_removed());
        assert_eq!(chart.series_count(), 0);
        assert!(matches!(chart.resize(10.0, 10.0), Err(ChartError::Disposed)));
        assert!(matches!(chart.remove(), Err(ChartError::Disposed)));
    }

    #[test]
    fn test_inverted_visible_range_rejected() {
        let mut chart = PaintedChart::new(ChartOptions::new(800.0, 400.0));
        assert!(chart
            .set_visible_range(VisibleRange { from: 10, to: 1 })
            .is_err());
        assert_eq!(chart.visible_range(), None);
    }

    #[test]
    fn test_pane_drops_disposed_charts() {
        let pane = ChartPane::new();
        pane.set_width(800.0);
        let mut library = EguiChartLibrary;

        let first = library
            .create_chart(&pane, ChartOptions::new(800.0, 400.0))
            .unwrap();
        let second = library
            .create_chart(&pane, ChartOptions::new(800.0, 400.0))
            .unwrap();
        assert_eq!(pane.chart_count(), 2);

        first.borrow_mut().remove().unwrap();
        assert_eq!(pane.chart_count(), 1);
        drop(second);
        assert_eq!(pane.chart_count(), 0);
    }

    #[test]
    fn test_hook_drives_painted_chart() {
        let pane = ChartPane::new();
        pane.set_width(720.0);
        let mut hook = UseChart::new(EguiChartLibrary);
        let series = scenario_series();

        let outcome = hook.run(&pane, &series, DisplayMode::Volume).unwrap();
        assert_eq!(outcome, Some(Attach::Attached));
        assert_eq!(pane.chart_count(), 1);

        let chart = pane.live_charts().remove(0);
        {
            let chart = chart.borrow();
            assert_eq!(chart.visible_range(), Some(VisibleRange { from: 1, to: 2 }));
            let id = hook.view().series_id().unwrap();
            let data = chart.series_data(id).unwrap();
            assert_eq!(data.kind(), SeriesKind::Line);
            assert_eq!(data.len(), 2);
        }

        pane.set_width(500.0);
        assert_eq!(chart.borrow().options().width, 500.0);
        assert_eq!(chart.borrow().options().height, 400.0);

        hook.run(&pane, &series, DisplayMode::Candlestick).unwrap();
        assert!(chart.borrow().is_removed());
        assert_eq!(pane.chart_count(), 1);
    }
}
