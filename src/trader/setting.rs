//! Global settings of the chart application.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{LazyLock, RwLock};

use super::utility::get_file_path;

/// Default settings
fn default_settings() -> HashMap<String, SettingValue> {
    let mut settings = HashMap::new();

    // Log settings
    settings.insert("log.active".to_string(), SettingValue::Bool(true));
    settings.insert("log.level".to_string(), SettingValue::Int(20)); // INFO level
    settings.insert("log.console".to_string(), SettingValue::Bool(true));
    settings.insert("log.file".to_string(), SettingValue::Bool(true));

    // Datafeed settings
    settings.insert("datafeed.name".to_string(), SettingValue::String("json".to_string()));
    settings.insert("datafeed.path".to_string(), SettingValue::String("ohlcv.json".to_string()));
    settings.insert("datafeed.url".to_string(), SettingValue::String(String::new()));
    settings.insert("datafeed.interval".to_string(), SettingValue::String("5m".to_string()));
    settings.insert("datafeed.cookie".to_string(), SettingValue::String(String::new()));
    settings.insert("datafeed.authorization".to_string(), SettingValue::String(String::new()));

    // Chart settings
    settings.insert(
        "chart.tickers".to_string(),
        SettingValue::String("RELIANCE.NS,MARUTI.NS,TCS.NS".to_string()),
    );

    settings
}

/// Setting value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl SettingValue {
    /// Get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Global settings container
pub struct Settings {
    settings: RwLock<HashMap<String, SettingValue>>,
    /// Why the setting file was ignored, kept until logging is up
    load_error: Option<String>,
}

impl Settings {
    /// Create new Settings with defaults, overlaid by the setting file
    pub fn new() -> Self {
        Self::from_file(&get_file_path(SETTING_FILENAME))
    }

    /// Create Settings with defaults, overlaid by the file at `path`.
    ///
    /// A missing file keeps the defaults. A malformed one does too, and the
    /// reason is kept in [`Settings::load_error`].
    pub fn from_file(path: &Path) -> Self {
        let mut settings = Self::with_defaults();
        match load_settings_from_file(path) {
            Ok(Some(file_settings)) => settings.update(file_settings),
            Ok(None) => {}
            Err(e) => settings.load_error = Some(e),
        }
        settings
    }

    /// Create Settings holding only the built-in defaults
    pub fn with_defaults() -> Self {
        Self {
            settings: RwLock::new(default_settings()),
            load_error: None,
        }
    }

    /// Error that made the setting file be ignored, if any
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Get a setting value
    pub fn get(&self, key: &str) -> Option<SettingValue> {
        self.settings.read().ok()?.get(key).cloned()
    }

    /// Get a string setting
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str().map(|s| s.to_string()))
    }

    /// Get a non-empty string setting
    pub fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get_string(key).filter(|s| !s.is_empty())
    }

    /// Get an integer setting
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_int())
    }

    /// Get a bool setting
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    /// Set a setting value
    pub fn set(&self, key: impl Into<String>, value: SettingValue) {
        if let Ok(mut settings) = self.settings.write() {
            settings.insert(key.into(), value);
        }
    }

    /// Update settings from a map
    pub fn update(&self, new_settings: HashMap<String, SettingValue>) {
        if let Ok(mut settings) = self.settings.write() {
            settings.extend(new_settings);
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Setting filename
const SETTING_FILENAME: &str = "chart_setting.json";

/// Load settings from a JSON file; `Ok(None)` when there is no file
fn load_settings_from_file(path: &Path) -> Result<Option<HashMap<String, SettingValue>>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("cannot read setting file {}: {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| format!("ignoring malformed setting file {}: {}", path.display(), e))
}

/// Global settings instance
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::new);
