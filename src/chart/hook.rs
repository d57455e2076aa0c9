//! Dependency-driven wrapper around [`ChartView`].
//!
//! Call [`UseChart::run`] once per frame with the current series and mode.
//! It only touches the chart when the inputs changed, or when the last try
//! found the container not ready.

use std::sync::Arc;

use super::api::ChartLibrary;
use super::view::{Attach, ChartView};
use crate::trader::{Bar, ChartError, DisplayMode};

pub struct UseChart<L: ChartLibrary> {
    view: ChartView<L>,
    deps: Option<(Arc<[Bar]>, DisplayMode)>,
    pending: bool,
}

impl<L: ChartLibrary> UseChart<L> {
    pub fn new(library: L) -> Self {
        Self {
            view: ChartView::new(library),
            deps: None,
            pending: false,
        }
    }

    /// Sync the chart with `series` and `mode`.
    ///
    /// Returns the attach outcome when an attach was attempted. Series are
    /// compared by identity: a freshly fetched series always rebuilds.
    pub fn run(
        &mut self,
        container: &L::Container,
        series: &Arc<[Bar]>,
        mode: DisplayMode,
    ) -> Result<Option<Attach>, ChartError> {
        let changed = match &self.deps {
            Some((prev_series, prev_mode)) => {
                !Arc::ptr_eq(prev_series, series) || *prev_mode != mode
            }
            None => true,
        };
        if !changed && !self.pending {
            return Ok(None);
        }

        if changed {
            self.view.detach();
            self.deps = Some((Arc::clone(series), mode));
        }

        match self.view.attach(container, series, mode) {
            Ok(outcome) => {
                self.pending = matches!(outcome, Attach::NotReady(_));
                Ok(Some(outcome))
            }
            Err(e) => {
                // Wait for new inputs rather than rebuilding every frame
                self.pending = false;
                Err(e)
            }
        }
    }

    /// Whether the last attach is waiting for data or a visible container
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn view(&self) -> &ChartView<L> {
        &self.view
    }

    /// Dispose the chart and forget the inputs it was built from
    pub fn clear(&mut self) {
        self.view.detach();
        self.deps = None;
        self.pending = false;
    }
}
