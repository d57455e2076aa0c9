//! Quote Chart - Main Application Entry Point
//!
//! Desktop viewer showing a ticker's quote history as candlesticks,
//! a close price line or volume.

use std::error::Error;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use eframe::egui;
use tracing::{debug, info, warn};

use quote_chart::chart::{Attach, ChartPane, EguiChartLibrary, NotReady, UseChart};
use quote_chart::trader::datafeed::configured_interval;
use quote_chart::trader::logger::{configured_level, level_to_string, LOGGER};
use quote_chart::trader::utility::split_list;
use quote_chart::trader::{
    create_datafeed, fetch_series, init_logger, Bar, DisplayMode, HistoryRequest, QuoteDatafeed,
    SETTINGS,
};

const DEFAULT_TICKERS: &str = "RELIANCE.NS, MARUTI.NS, TCS.NS";

/// Fetched series tagged with the ticker it was requested for
type FetchResult = (String, Arc<[Bar]>);

/// Application state holding the chart card
struct QuoteChartApp {
    datafeed: Arc<dyn QuoteDatafeed>,
    interval: String,
    tickers: Vec<String>,
    ticker: String,
    mode: DisplayMode,
    series: Arc<[Bar]>,
    loading: bool,
    pane: ChartPane,
    chart: UseChart<EguiChartLibrary>,
    sender: Sender<FetchResult>,
    receiver: Receiver<FetchResult>,
    /// Runtime handle for async operations
    runtime: tokio::runtime::Handle,
    ctx: egui::Context,
}

impl QuoteChartApp {
    /// Create a new application instance
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let runtime = tokio::runtime::Handle::current();
        let datafeed = create_datafeed();
        info!("datafeed: {}", datafeed.name());

        let mut tickers = split_list(
            &SETTINGS
                .get_non_empty("chart.tickers")
                .unwrap_or_else(|| DEFAULT_TICKERS.to_string()),
        );
        if tickers.is_empty() {
            tickers = split_list(DEFAULT_TICKERS);
        }
        let ticker = tickers.first().cloned().unwrap_or_default();

        let (sender, receiver) = mpsc::channel();
        let mut app = Self {
            datafeed,
            interval: configured_interval(&SETTINGS),
            tickers,
            ticker,
            mode: DisplayMode::default(),
            series: Arc::from(Vec::new()),
            loading: false,
            pane: ChartPane::new(),
            chart: UseChart::new(EguiChartLibrary),
            sender,
            receiver,
            runtime,
            ctx: cc.egui_ctx.clone(),
        };
        app.request_history();
        app
    }

    /// Fetch the selected ticker's history in the background
    fn request_history(&mut self) {
        let req = HistoryRequest::new(self.ticker.clone()).with_interval(self.interval.as_str());
        let datafeed = self.datafeed.clone();
        let sender = self.sender.clone();
        let ctx = self.ctx.clone();

        self.loading = true;
        self.runtime.spawn(async move {
            let bars = fetch_series(datafeed.as_ref(), &req).await;
            // The receiver only goes away when the app closes
            let _ = sender.send((req.ticker, bars));
            ctx.request_repaint();
        });
    }

    /// Take finished fetches, keeping only the selected ticker's series
    fn process_results(&mut self) {
        while let Ok((ticker, bars)) = self.receiver.try_recv() {
            if ticker != self.ticker {
                debug!(%ticker, "discarding history for unselected ticker");
                continue;
            }
            info!(%ticker, bars = bars.len(), "history loaded");
            self.series = bars;
            self.loading = false;
        }
    }

    fn show_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let mut selected = self.ticker.clone();
            egui::ComboBox::from_id_salt("ticker")
                .selected_text(selected.as_str())
                .show_ui(ui, |ui| {
                    for ticker in &self.tickers {
                        ui.selectable_value(&mut selected, ticker.clone(), ticker.as_str());
                    }
                });
            if selected != self.ticker {
                info!(ticker = %selected, "ticker selected");
                self.ticker = selected;
                self.request_history();
            }

            ui.separator();
            for mode in DisplayMode::all() {
                if ui
                    .selectable_label(self.mode == mode, mode.display_name())
                    .clicked()
                {
                    self.mode = mode;
                }
            }

            if self.loading {
                ui.spinner();
            }
        });
    }

    fn show_chart(&mut self, ui: &mut egui::Ui) {
        self.pane.measure(ui);

        match self.chart.run(&self.pane, &self.series, self.mode) {
            Ok(Some(Attach::NotReady(NotReady::ZeroWidth))) => {
                debug!("chart pane has no width yet");
            }
            Err(e) => warn!("failed to build chart: {}", e),
            _ => {}
        }

        if self.chart.view().is_attached() {
            self.pane.paint(ui);
        } else {
            let text = if self.loading { "Loading..." } else { "No data" };
            ui.add_sized([ui.available_width(), self.chart.view().height()], egui::Label::new(text));
        }
    }
}

impl eframe::App for QuoteChartApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_results();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(self.ticker.as_str());
            self.show_toolbar(ui);
            ui.separator();
            self.show_chart(ui);
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.chart.clear();
        LOGGER.info("Quote Chart closed");
    }
}

/// Create native window options
fn create_native_options() -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Quote Chart")
            .with_inner_size([1100.0, 560.0])
            .with_min_inner_size([480.0, 480.0]),
        ..Default::default()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Create tokio runtime
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    init_logger();

    let level = configured_level(&SETTINGS);
    LOGGER.info(&format!(
        "Quote Chart {} starting, log level {}",
        quote_chart::VERSION,
        level_to_string(level)
    ));

    eframe::run_native(
        "Quote Chart",
        create_native_options(),
        Box::new(|cc| Ok(Box::new(QuoteChartApp::new(cc)))),
    )
    .map_err(|e| format!("Failed to run application: {}", e))?;

    Ok(())
}
