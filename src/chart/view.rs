//! Chart lifecycle controller.
//!
//! [`ChartView`] keeps exactly one chart alive for the latest (series, mode)
//! pair it was attached with. Every attach tears the previous chart down and
//! builds a new one; nothing is patched in place.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;

use super::api::{
    ChartApi, ChartLibrary, ChartOptions, Container, ResizeCallback, ResizeObserver, SeriesId,
    SharedChart, TimeScaleOptions,
};
use super::base::CHART_HEIGHT;
use super::projection::{project, series_options, visible_range};
use crate::trader::{Bar, ChartError, DisplayMode};

/// Why an attach was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotReady {
    EmptySeries,
    ZeroWidth,
}

/// Outcome of [`ChartView::attach`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attach {
    Attached,
    /// Nothing was rendered and the previous chart, if any, was left alone
    NotReady(NotReady),
}

/// The live chart, its renderer and resize observer.
struct ChartSession {
    chart: SharedChart,
    series: SeriesId,
    mode: DisplayMode,
    /// Cleared before teardown; resize callbacks check it first
    alive: Rc<Cell<bool>>,
    observer: Box<dyn ResizeObserver>,
}

impl ChartSession {
    /// Tear the session down. Never fails.
    fn dispose(mut self) {
        self.alive.set(false);
        self.observer.disconnect();

        let Ok(mut chart) = self.chart.try_borrow_mut() else {
            tracing::debug!("chart busy during teardown, dropping handle");
            return;
        };
        if chart.is_removed() {
            tracing::debug!("chart already disposed");
            return;
        }
        if let Err(e) = chart.remove() {
            tracing::debug!("ignoring chart removal error: {}", e);
        }
    }
}

/// Owns one chart per container for the lifetime of the view.
pub struct ChartView<L: ChartLibrary> {
    library: L,
    session: Option<ChartSession>,
    height: f32,
}

impl<L: ChartLibrary> ChartView<L> {
    /// Create a view drawing charts with `library`
    pub fn new(library: L) -> Self {
        Self {
            library,
            session: None,
            height: CHART_HEIGHT,
        }
    }

    /// Render `series` in `mode` into `container`.
    ///
    /// Skips rendering when the series is empty or the container has no
    /// width yet. Otherwise the previous chart is disposed before the new
    /// one is created. Backend errors while building are returned after the
    /// half-built chart has been disposed.
    pub fn attach(
        &mut self,
        container: &L::Container,
        series: &Arc<[Bar]>,
        mode: DisplayMode,
    ) -> Result<Attach, ChartError> {
        if series.is_empty() {
            tracing::debug!(%mode, "empty series, chart not rendered");
            return Ok(Attach::NotReady(NotReady::EmptySeries));
        }
        let width = container.client_width();
        if width.is_nan() || width <= 0.0 {
            tracing::debug!(%mode, "container has no width, chart not rendered");
            return Ok(Attach::NotReady(NotReady::ZeroWidth));
        }

        self.detach();

        let chart = self
            .library
            .create_chart(container, ChartOptions::new(width, self.height))?;

        let configured = configure(&mut *chart.borrow_mut(), series, mode);
        let series_id = match configured {
            Ok(id) => id,
            Err(e) => {
                if let Err(remove_error) = chart.borrow_mut().remove() {
                    tracing::debug!("ignoring chart removal error: {}", remove_error);
                }
                return Err(e);
            }
        };

        let alive = Rc::new(Cell::new(true));
        let observer = container.observe_resize(resize_callback(
            Rc::downgrade(&chart),
            alive.clone(),
            self.height,
        ));

        tracing::info!(%mode, bars = series.len(), width, "chart attached");
        self.session = Some(ChartSession {
            chart,
            series: series_id,
            mode,
            alive,
            observer,
        });
        Ok(Attach::Attached)
    }

    /// Dispose the current chart, if any. Safe to call repeatedly.
    pub fn detach(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!(mode = %session.mode, "chart detached");
            session.dispose();
        }
    }

    pub fn is_attached(&self) -> bool {
        self.session.is_some()
    }

    /// Display mode of the live chart
    pub fn mode(&self) -> Option<DisplayMode> {
        self.session.as_ref().map(|session| session.mode)
    }

    /// Renderer handle of the live chart
    pub fn series_id(&self) -> Option<SeriesId> {
        self.session.as_ref().map(|session| session.series)
    }

    /// Fixed chart height in logical pixels
    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn library(&self) -> &L {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut L {
        &mut self.library
    }
}

impl<L: ChartLibrary> Drop for ChartView<L> {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Add the mode's renderer, its data and the time scale setup
fn configure(
    chart: &mut dyn ChartApi,
    series: &Arc<[Bar]>,
    mode: DisplayMode,
) -> Result<SeriesId, ChartError> {
    let id = chart.add_series(series_options(mode))?;
    chart.set_series_data(id, project(series, mode))?;

    if let Some(range) = visible_range(series) {
        chart.set_visible_range(range)?;
    }
    chart.apply_time_scale_options(TimeScaleOptions::default())?;
    Ok(id)
}

/// Width-only resize, ignored once the session is gone
fn resize_callback(
    chart: Weak<RefCell<dyn ChartApi>>,
    alive: Rc<Cell<bool>>,
    height: f32,
) -> ResizeCallback {
    Box::new(move |width| {
        if !alive.get() || width.is_nan() || width <= 0.0 {
            return;
        }
        let Some(chart) = chart.upgrade() else {
            return;
        };
        let Ok(mut guard) = chart.try_borrow_mut() else {
            return;
        };
        if guard.is_removed() {
            return;
        }
        if let Err(e) = guard.resize(width, height) {
            tracing::warn!("chart resize failed: {}", e);
        }
    })
}
