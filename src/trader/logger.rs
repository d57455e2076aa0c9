//! Logging setup for the chart application.

use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::setting::{Settings, SETTINGS};
use super::utility::get_folder_path;

/// Numeric log levels used by the `log.level` setting
pub const DEBUG: i32 = 10;
pub const INFO: i32 = 20;
pub const WARNING: i32 = 30;
pub const ERROR: i32 = 40;
pub const CRITICAL: i32 = 50;

/// Convert integer log level to tracing Level
pub fn level_from_int(level: i32) -> Level {
    match level {
        i32::MIN..=10 => Level::DEBUG,
        11..=20 => Level::INFO,
        21..=30 => Level::WARN,
        _ => Level::ERROR,
    }
}

/// Convert integer log level to string
pub fn level_to_string(level: i32) -> &'static str {
    match level {
        i32::MIN..=10 => "DEBUG",
        11..=20 => "INFO",
        21..=30 => "WARNING",
        31..=40 => "ERROR",
        _ => "CRITICAL",
    }
}

/// Initialize the global subscriber from the log settings.
///
/// Calling it again after a subscriber is installed does nothing.
pub fn init_logger() {
    if !SETTINGS.get_bool("log.active").unwrap_or(true) {
        return;
    }
    let log_level = configured_level(&SETTINGS);
    let log_console = SETTINGS.get_bool("log.console").unwrap_or(true);
    let log_file = SETTINGS.get_bool("log.file").unwrap_or(true);

    let level = level_from_int(log_level);
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let console_layer = log_console.then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_ansi(true)
    });

    let log_path = get_log_file_path();
    let mut file_error = None;
    let file_layer = if log_file {
        match open_log_file(&log_path) {
            Ok(file) => Some(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false)),
            Err(e) => {
                file_error = Some(e);
                None
            }
        }
    } else {
        None
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if installed {
        if let Some(e) = file_error {
            tracing::warn!("cannot open log file {}: {}", log_path.display(), e);
        }
        if let Some(e) = SETTINGS.load_error() {
            tracing::warn!("{}", e);
        }
    }
}

/// Level from `log.level`, falling back to INFO when unset or out of range
pub fn configured_level(settings: &Settings) -> i32 {
    settings
        .get_int("log.level")
        .and_then(|level| i32::try_from(level).ok())
        .unwrap_or(INFO)
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Get the log file path for today
fn get_log_file_path() -> PathBuf {
    let log_folder = get_folder_path("log");
    let today = Local::now().format("%Y%m%d").to_string();
    log_folder.join(format!("qc_{}.log", today))
}

/// Named logger, tagging every message with its name
pub struct Logger {
    pub name: String,
}

impl Logger {
    /// Create a new logger with a name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn debug(&self, msg: &str) {
        tracing::debug!(logger = %self.name, "{}", msg);
    }

    pub fn info(&self, msg: &str) {
        tracing::info!(logger = %self.name, "{}", msg);
    }

    pub fn warn(&self, msg: &str) {
        tracing::warn!(logger = %self.name, "{}", msg);
    }

    pub fn error(&self, msg: &str) {
        tracing::error!(logger = %self.name, "{}", msg);
    }

    /// Log a message with specific level
    pub fn log(&self, level: i32, msg: &str) {
        match level {
            i32::MIN..=10 => self.debug(msg),
            11..=20 => self.info(msg),
            21..=30 => self.warn(msg),
            _ => self.error(msg),
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new("QuoteChart")
    }
}

/// Global logger instance
pub static LOGGER: LazyLock<Logger> = LazyLock::new(Logger::default);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trader::setting::SettingValue;

    #[test]
    fn test_level_from_int() {
        assert_eq!(level_from_int(DEBUG), Level::DEBUG);
        assert_eq!(level_from_int(INFO), Level::INFO);
        assert_eq!(level_from_int(WARNING), Level::WARN);
        assert_eq!(level_from_int(ERROR), Level::ERROR);
        assert_eq!(level_from_int(0), Level::DEBUG);
    }

    #[test]
    fn test_level_to_string() {
        assert_eq!(level_to_string(DEBUG), "DEBUG");
        assert_eq!(level_to_string(INFO), "INFO");
        assert_eq!(level_to_string(WARNING), "WARNING");
        assert_eq!(level_to_string(ERROR), "ERROR");
        assert_eq!(level_to_string(CRITICAL), "CRITICAL");
    }

    #[test]
    fn test_configured_level() {
        let settings = Settings::with_defaults();
        assert_eq!(configured_level(&settings), INFO);

        settings.set("log.level", SettingValue::Int(10));
        assert_eq!(configured_level(&settings), DEBUG);

        // Would wrap to 10 if truncated
        settings.set("log.level", SettingValue::Int((1_i64 << 32) + 10));
        assert_eq!(configured_level(&settings), INFO);

        settings.set("log.level", SettingValue::String("debug".to_string()));
        assert_eq!(configured_level(&settings), INFO);
    }

    #[test]
    fn test_logger_new() {
        let logger = Logger::new("ChartView");
        assert_eq!(logger.name, "ChartView");
        assert_eq!(LOGGER.name, "QuoteChart");
    }
}
