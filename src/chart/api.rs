//! Charting backend interface.
//!
//! A backend is split the way charting libraries usually are: a
//! [`ChartLibrary`] creates charts into a [`Container`], and each chart is
//! driven through [`ChartApi`]. Charts are shared between their owner and
//! the container's resize callbacks, so they live behind `Rc<RefCell<_>>`.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;

use super::base::{
    BACKGROUND_COLOR, BAR_SPACING, CHART_HEIGHT, GRID_COLOR, LINE_WIDTH, TEXT_COLOR,
};
use crate::trader::{Bar, ChartError, LineData};

/// A chart instance shared between its owner and resize callbacks
pub type SharedChart = Rc<RefCell<dyn ChartApi>>;

/// Callback receiving the container's new width
pub type ResizeCallback = Box<dyn FnMut(f32)>;

/// Handle to a series renderer inside one chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrosshairMode {
    #[default]
    Normal,
    Magnet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    pub background: String,
    pub text_color: String,
    pub attribution_logo: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridOptions {
    pub vert_lines: String,
    pub horz_lines: String,
}

/// Options a chart is created with
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub width: f32,
    pub height: f32,
    pub layout: LayoutOptions,
    pub grid: GridOptions,
    pub crosshair: CrosshairMode,
    /// Show the time axis
    pub time_visible: bool,
}

impl ChartOptions {
    /// Dark dashboard look at the given size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            layout: LayoutOptions {
                background: BACKGROUND_COLOR.to_string(),
                text_color: TEXT_COLOR.to_string(),
                attribution_logo: false,
            },
            grid: GridOptions {
                vert_lines: GRID_COLOR.to_string(),
                horz_lines: GRID_COLOR.to_string(),
            },
            crosshair: CrosshairMode::Normal,
            time_visible: true,
        }
    }
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self::new(0.0, CHART_HEIGHT)
    }
}

/// Renderer type of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    Candlestick,
    Line,
}

impl SeriesKind {
    pub fn name(&self) -> &'static str {
        match self {
            SeriesKind::Candlestick => "candlestick",
            SeriesKind::Line => "line",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesOptions {
    pub kind: SeriesKind,
    /// Line color, ignored by candlesticks
    pub color: Option<String>,
    pub line_width: f32,
}

impl SeriesOptions {
    pub fn candlestick() -> Self {
        Self {
            kind: SeriesKind::Candlestick,
            color: None,
            line_width: 1.0,
        }
    }

    pub fn line(color: &str) -> Self {
        Self {
            kind: SeriesKind::Line,
            color: Some(color.to_string()),
            line_width: LINE_WIDTH,
        }
    }
}

/// Data handed to a series renderer
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesData {
    /// Bars rendered as they are
    Candlestick(Arc<[Bar]>),
    Line(Vec<LineData>),
}

impl SeriesData {
    /// Renderer type this data is meant for
    pub fn kind(&self) -> SeriesKind {
        match self {
            SeriesData::Candlestick(_) => SeriesKind::Candlestick,
            SeriesData::Line(_) => SeriesKind::Line,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SeriesData::Candlestick(bars) => bars.len(),
            SeriesData::Line(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Time of the point at `ix`
    pub fn time_at(&self, ix: usize) -> Option<i64> {
        match self {
            SeriesData::Candlestick(bars) => bars.get(ix).map(|bar| bar.time),
            SeriesData::Line(points) => points.get(ix).map(|point| point.time),
        }
    }
}

/// Inclusive time range shown on the time axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
    pub from: i64,
    pub to: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScaleOptions {
    /// Empty space after the last bar, in bars
    pub right_offset: f32,
    /// Pixels per bar
    pub bar_spacing: f32,
    /// Disallow scrolling before the first bar
    pub fix_left_edge: bool,
    /// Disallow scrolling past the last bar
    pub fix_right_edge: bool,
}

impl Default for TimeScaleOptions {
    fn default() -> Self {
        Self {
            right_offset: 0.0,
            bar_spacing: BAR_SPACING,
            fix_left_edge: true,
            fix_right_edge: true,
        }
    }
}

/// One chart instance.
///
/// Every mutating call on a removed chart fails with [`ChartError::Disposed`].
pub trait ChartApi {
    fn add_series(&mut self, options: SeriesOptions) -> Result<SeriesId, ChartError>;

    fn set_series_data(&mut self, series: SeriesId, data: SeriesData) -> Result<(), ChartError>;

    fn set_visible_range(&mut self, range: VisibleRange) -> Result<(), ChartError>;

    fn apply_time_scale_options(&mut self, options: TimeScaleOptions) -> Result<(), ChartError>;

    fn resize(&mut self, width: f32, height: f32) -> Result<(), ChartError>;

    /// Dispose the chart and everything it renders
    fn remove(&mut self) -> Result<(), ChartError>;

    fn is_removed(&self) -> bool;
}

/// Registration of a resize callback on a container
pub trait ResizeObserver {
    /// Stop delivering callbacks; calling it again is a no-op
    fn disconnect(&mut self);
}

/// Something a chart can be mounted into
pub trait Container {
    /// Current width in logical pixels
    fn client_width(&self) -> f32;

    /// Call `callback` with the new width whenever the width changes
    fn observe_resize(&self, callback: ResizeCallback) -> Box<dyn ResizeObserver>;
}

/// Factory for charts of one backend
pub trait ChartLibrary {
    type Container: Container + ?Sized;

    fn create_chart(
        &mut self,
        container: &Self::Container,
        options: ChartOptions,
    ) -> Result<SharedChart, ChartError>;
}

/// Registered callbacks of one [`ObservedWidth`]
#[derive(Default)]
struct ObserverList {
    entries: Vec<(u64, ResizeCallback)>,
    /// Nesting depth of width notifications in progress
    dispatch_depth: usize,
    /// Ids disconnected while their callbacks were out for dispatch
    disconnected: Vec<u64>,
}

/// Width tracking plus resize observer bookkeeping for container types.
#[derive(Default)]
pub struct ObservedWidth {
    width: Cell<f32>,
    next_id: Cell<u64>,
    observers: Rc<RefCell<ObserverList>>,
}

impl ObservedWidth {
    pub fn new(width: f32) -> Self {
        Self {
            width: Cell::new(width),
            ..Self::default()
        }
    }

    pub fn get(&self) -> f32 {
        self.width.get()
    }

    /// Record a new width; observers hear about it only if it changed.
    ///
    /// Returns whether the width changed.
    pub fn set(&self, width: f32) -> bool {
        if self.width.get() == width {
            return false;
        }
        self.width.set(width);

        // Callbacks run without the list borrowed so they may register or
        // disconnect observers
        let mut callbacks = {
            let mut list = self.observers.borrow_mut();
            list.dispatch_depth += 1;
            std::mem::take(&mut list.entries)
        };
        for (id, callback) in callbacks.iter_mut() {
            if self.observers.borrow().disconnected.contains(id) {
                continue;
            }
            callback(width);
        }

        let mut list = self.observers.borrow_mut();
        list.dispatch_depth -= 1;
        let disconnected = if list.dispatch_depth == 0 {
            std::mem::take(&mut list.disconnected)
        } else {
            list.disconnected.clone()
        };
        callbacks.retain(|(id, _)| !disconnected.contains(id));
        callbacks.append(&mut list.entries);
        list.entries = callbacks;
        true
    }

    pub fn observe(&self, callback: ResizeCallback) -> Box<dyn ResizeObserver> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.observers.borrow_mut().entries.push((id, callback));
        Box::new(ObserverHandle {
            id,
            observers: Rc::downgrade(&self.observers),
        })
    }

    /// Number of connected observers
    pub fn observer_count(&self) -> usize {
        self.observers.borrow().entries.len()
    }
}

struct ObserverHandle {
    id: u64,
    observers: Weak<RefCell<ObserverList>>,
}

impl ResizeObserver for ObserverHandle {
    fn disconnect(&mut self) {
        let Some(observers) = self.observers.upgrade() else {
            return;
        };
        // Disposal must not panic
        if let Ok(mut list) = observers.try_borrow_mut() {
            list.entries.retain(|(id, _)| *id != self.id);
            if list.dispatch_depth > 0 && !list.disconnected.contains(&self.id) {
                list.disconnected.push(self.id);
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<f32>>>, ResizeCallback) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, Box::new(move |width| sink.borrow_mut().push(width)))
    }

    #[test]
    fn test_observed_width_notifies_on_change_only() {
        let width = ObservedWidth::new(800.0);
        let (seen, callback) = recorder();
        let _observer = width.observe(callback);

        assert!(!width.set(800.0));
        assert!(width.set(400.0));
        assert!(!width.set(400.0));

        assert_eq!(*seen.borrow(), vec![400.0]);
        assert_eq!(width.get(), 400.0);
    }

    #[test]
    fn test_disconnect_stops_callbacks() {
        let width = ObservedWidth::new(800.0);
        let (seen, callback) = recorder();
        let mut observer = width.observe(callback);
        assert_eq!(width.observer_count(), 1);

        observer.disconnect();
        observer.disconnect();
        assert_eq!(width.observer_count(), 0);

        width.set(400.0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_disconnect_inside_callback_sticks() {
        let width = ObservedWidth::new(800.0);
        let (seen, callback) = recorder();

        let target: Rc<RefCell<Option<Box<dyn ResizeObserver>>>> = Rc::new(RefCell::new(None));
        let handle = target.clone();
        let _first = width.observe(Box::new(move |_| {
            if let Some(observer) = handle.borrow_mut().as_mut() {
                observer.disconnect();
            }
        }));
        *target.borrow_mut() = Some(width.observe(callback));
        assert_eq!(width.observer_count(), 2);

        width.set(400.0);
        assert_eq!(width.observer_count(), 1);
        width.set(300.0);
        assert_eq!(width.observer_count(), 1);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_callback_can_disconnect_itself() {
        let width = ObservedWidth::new(800.0);
        let calls = Rc::new(Cell::new(0));

        let slot: Rc<RefCell<Option<Box<dyn ResizeObserver>>>> = Rc::new(RefCell::new(None));
        let handle = slot.clone();
        let counter = calls.clone();
        let observer = width.observe(Box::new(move |_| {
            counter.set(counter.get() + 1);
            if let Some(observer) = handle.borrow_mut().as_mut() {
                observer.disconnect();
            }
        }));
        *slot.borrow_mut() = Some(observer);

        width.set(400.0);
        width.set(300.0);
        assert_eq!(calls.get(), 1);
        assert_eq!(width.observer_count(), 0);
    }

    #[test]
    fn test_disconnect_after_container_dropped() {
        let width = ObservedWidth::new(800.0);
        let (_, callback) = recorder();
        let mut observer = width.observe(callback);
        drop(width);
        observer.disconnect();
    }

    #[test]
    fn test_default_time_scale_options() {
        let options = TimeScaleOptions::default();
        assert_eq!(options.right_offset, 0.0);
        assert_eq!(options.bar_spacing, 5.0);
        assert!(options.fix_left_edge && options.fix_right_edge);
    }

    #[test]
    fn test_series_data_kind() {
        let line = SeriesData::Line(vec![LineData::new(1, 11.0)]);
        assert_eq!(line.kind(), SeriesKind::Line);
        assert_eq!(line.time_at(0), Some(1));
        assert_eq!(line.time_at(1), None);
    }
}
