//! Recording chart backend used by the lifecycle tests.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use super::api::{
    ChartApi, ChartLibrary, ChartOptions, Container, ObservedWidth, ResizeCallback,
    ResizeObserver, SeriesData, SeriesId, SeriesOptions, SharedChart, TimeScaleOptions,
    VisibleRange,
};
use crate::trader::{Bar, ChartError};

pub struct RecordingChart {
    pub options: ChartOptions,
    pub series: Vec<(SeriesId, SeriesOptions, Option<SeriesData>)>,
    pub visible_range: Option<VisibleRange>,
    pub time_scale: Option<TimeScaleOptions>,
    pub resizes: Vec<(f32, f32)>,
    pub remove_calls: usize,
    pub removed: bool,
    /// Make `set_visible_range` fail
    pub fail_range: bool,
}

impl RecordingChart {
    fn new(options: ChartOptions) -> Self {
        Self {
            options,
            series: Vec::new(),
            visible_range: None,
            time_scale: None,
            resizes: Vec::new(),
            remove_calls: 0,
            removed: false,
            fail_range: false,
        }
    }

    fn ensure_live(&self) -> Result<(), ChartError> {
        if self.removed {
            Err(ChartError::Disposed)
        } else {
            Ok(())
        }
    }
}

impl ChartApi for RecordingChart {
    fn add_series(&mut self, options: SeriesOptions) -> Result<SeriesId, ChartError> {
        self.ensure_live()?;
        let id = SeriesId(self.series.len() as u32);
        self.series.push((id, options, None));
        Ok(id)
    }

    fn set_series_data(&mut self, series: SeriesId, data: SeriesData) -> Result<(), ChartError> {
        self.ensure_live()?;
        let entry = self
            .series
            .iter_mut()
            .find(|(id, _, _)| *id == series)
            .ok_or(ChartError::UnknownSeries(series.0))?;
        entry.2 = Some(data);
        Ok(())
    }

    fn set_visible_range(&mut self, range: VisibleRange) -> Result<(), ChartError> {
        self.ensure_live()?;
        if self.fail_range {
            return Err(ChartError::Backend("range rejected".to_string()));
        }
        self.visible_range = Some(range);
        Ok(())
    }

    fn apply_time_scale_options(&mut self, options: TimeScaleOptions) -> Result<(), ChartError> {
        self.ensure_live()?;
        self.time_scale = Some(options);
        Ok(())
    }

    fn resize(&mut self, width: f32, height: f32) -> Result<(), ChartError> {
        self.ensure_live()?;
        self.resizes.push((width, height));
        Ok(())
    }

    fn remove(&mut self) -> Result<(), ChartError> {
        self.remove_calls += 1;
        self.ensure_live()?;
        self.removed = true;
        Ok(())
    }

    fn is_removed(&self) -> bool {
        self.removed
    }
}

#[derive(Default)]
pub struct RecordingLibrary {
    pub charts: Vec<Rc<RefCell<RecordingChart>>>,
    /// Make the next created chart reject its visible range
    pub fail_next_range: bool,
}

impl RecordingLibrary {
    /// Charts that have not been removed
    pub fn live_charts(&self) -> Vec<Rc<RefCell<RecordingChart>>> {
        self.charts
            .iter()
            .filter(|chart| !chart.borrow().removed)
            .cloned()
            .collect()
    }

    pub fn last_chart(&self) -> Rc<RefCell<RecordingChart>> {
        self.charts.last().cloned().expect("no chart created")
    }
}

impl ChartLibrary for RecordingLibrary {
    type Container = TestContainer;

    fn create_chart(
        &mut self,
        _container: &TestContainer,
        options: ChartOptions,
    ) -> Result<SharedChart, ChartError> {
        let mut chart = RecordingChart::new(options);
        chart.fail_range = std::mem::take(&mut self.fail_next_range);
        let chart = Rc::new(RefCell::new(chart));
        self.charts.push(chart.clone());
        Ok(chart)
    }
}

pub struct TestContainer {
    pub width: ObservedWidth,
}

impl TestContainer {
    pub fn new(width: f32) -> Self {
        Self {
            width: ObservedWidth::new(width),
        }
    }
}

impl Container for TestContainer {
    fn client_width(&self) -> f32 {
        self.width.get()
    }

    fn observe_resize(&self, callback: ResizeCallback) -> Box<dyn ResizeObserver> {
        self.width.observe(callback)
    }
}

pub fn scenario_series() -> Arc<[Bar]> {
    Arc::from(vec![
        Bar::new(1, 10.0, 12.0, 9.0, 11.0, Some(100.0)),
        Bar::new(2, 11.0, 13.0, 10.0, 12.0, Some(150.0)),
    ])
}

pub fn empty_series() -> Arc<[Bar]> {
    Arc::from(Vec::new())
}
