//! Configuration module for StationVis-RS
//!
//! This module handles application configuration including:
//! - The dashboard configuration (device address, polling, plots) in TOML
//! - Application state persistence (UI preferences) in JSON
//!
//! # App Data Location
//!
//! Application data is stored in the platform-appropriate location:
//! - **Linux**: `~/.local/share/dev.stationvis.stationvis-rs/`
//! - **macOS**: `~/Library/Application Support/dev.stationvis.stationvis-rs/`
//! - **Windows**: `%APPDATA%\dev.stationvis.stationvis-rs\`
//!
//! # Files
//!
//! - `stationvis.toml` - Dashboard configuration (optional, defaults apply)
//! - `app_state.json` - Dark mode and the last zoom preset
//!
//! # Example
//!
//! ```ignore
//! use stationvis_rs::config::{AppState, DashboardConfig};
//!
//! let config = DashboardConfig::load_or_default(None);
//! let mut state = AppState::load_or_default();
//! state.ui_preferences.set_zoom_preset(6);
//! state.save()?;
//! ```

pub mod plots;
pub mod settings;

pub use plots::*;
pub use settings::*;

use crate::chart::mapper::Viewport;
use crate::error::{Result, StationVisError};
use crate::types::{DEFAULT_MAX_PLOT_POINTS, DEFAULT_RECENCY_WINDOW_SECS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application identifier for data directories
pub const APP_ID: &str = "dev.stationvis.stationvis-rs";

/// App state filename
pub const APP_STATE_FILE: &str = "app_state.json";

/// Dashboard configuration filename
pub const DASHBOARD_CONFIG_FILE: &str = "stationvis.toml";

/// Default station address (the firmware's access-point IP)
pub const DEFAULT_DEVICE_URL: &str = "http://192.168.4.1";

/// Default bucket poll interval in seconds
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 14;

/// Default timeout for small requests in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 6_000;

/// Default timeout for bucket batches in milliseconds
pub const DEFAULT_BUCKETS_TIMEOUT_MS: u64 = 20_000;

/// Positional field names of a compact bucket tuple after the epoch
pub const DEFAULT_BUCKET_FIELDS: [&str; 9] = [
    "avgWind",
    "maxWind",
    "samples",
    "avgTempC",
    "avgHumRH",
    "avgPressHpa",
    "avgPM1",
    "avgPM25",
    "avgPM10",
];

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        StationVisError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            StationVisError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the app state file
pub fn app_state_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(APP_STATE_FILE))
}

/// Get the default path of the dashboard configuration file
pub fn dashboard_config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(DASHBOARD_CONFIG_FILE))
}

// ==================== Dashboard Config ====================

/// Per-endpoint request deadlines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchTimeouts {
    /// `/api/config` and other small requests
    #[serde(default = "default_timeout_ms")]
    pub default_ms: u64,

    /// `/api/buckets_compact`
    #[serde(default = "default_buckets_timeout_ms")]
    pub buckets_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_buckets_timeout_ms() -> u64 {
    DEFAULT_BUCKETS_TIMEOUT_MS
}

impl Default for FetchTimeouts {
    fn default() -> Self {
        Self {
            default_ms: DEFAULT_TIMEOUT_MS,
            buckets_ms: DEFAULT_BUCKETS_TIMEOUT_MS,
        }
    }
}

impl FetchTimeouts {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_ms.max(1))
    }

    pub fn buckets_timeout(&self) -> Duration {
        Duration::from_millis(self.buckets_ms.max(1))
    }
}

/// Dashboard configuration loaded from `stationvis.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Base URL of the station, without a trailing path
    #[serde(default = "default_device_url")]
    pub device_url: String,

    /// Seconds between bucket polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Request deadlines
    #[serde(default)]
    pub timeouts: FetchTimeouts,

    /// Ask the device for its plot layout before the first poll
    #[serde(default = "default_true")]
    pub fetch_device_config: bool,

    /// Samples older than this many seconds before the device clock are dropped
    #[serde(default = "default_recency_window_secs")]
    pub recency_window_secs: i64,

    /// Names for the positional values following the epoch in a bucket tuple
    #[serde(default = "default_bucket_fields")]
    pub bucket_fields: Vec<String>,

    /// Maximum points per rendered polyline
    #[serde(default = "default_max_plot_points")]
    pub max_plot_points: usize,

    /// Logical pixel size of each pane
    #[serde(default)]
    pub viewport: Viewport,

    /// Local plot layout, used until (or unless) the device provides one
    #[serde(default = "default_plots")]
    pub plots: Vec<PlotSpec>,
}

fn default_true() -> bool {
    true
}

fn default_device_url() -> String {
    DEFAULT_DEVICE_URL.to_string()
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_recency_window_secs() -> i64 {
    DEFAULT_RECENCY_WINDOW_SECS
}

fn default_bucket_fields() -> Vec<String> {
    DEFAULT_BUCKET_FIELDS.iter().map(|s| s.to_string()).collect()
}

fn default_max_plot_points() -> usize {
    DEFAULT_MAX_PLOT_POINTS
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            device_url: default_device_url(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            timeouts: FetchTimeouts::default(),
            fetch_device_config: true,
            recency_window_secs: DEFAULT_RECENCY_WINDOW_SECS,
            bucket_fields: default_bucket_fields(),
            max_plot_points: DEFAULT_MAX_PLOT_POINTS,
            viewport: Viewport::default(),
            plots: default_plots(),
        }
    }
}

impl DashboardConfig {
    /// Load a dashboard config from a TOML file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            StationVisError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            StationVisError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or the default location, returning defaults on any error
    ///
    /// A missing file at the default location is not an error.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match dashboard_config_path() {
                Some(p) if p.exists() => p,
                _ => return Self::default(),
            },
        };

        Self::load_from(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load dashboard config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save as TOML
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| StationVisError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| StationVisError::Config(format!("Failed to write config: {}", e)))
    }

    /// Reject values the poller or chart cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.device_url.trim().is_empty() {
            return Err(StationVisError::Config("device_url is empty".to_string()));
        }
        if self.poll_interval_secs == 0 {
            return Err(StationVisError::Config(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.recency_window_secs <= 0 {
            return Err(StationVisError::Config(
                "recency_window_secs must be positive".to_string(),
            ));
        }
        if !self.viewport.is_usable() {
            return Err(StationVisError::Config(
                "viewport leaves no room for the plot area".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// The local plot layout in the device's config shape
    pub fn chart_config(&self) -> DeviceChartConfig {
        DeviceChartConfig {
            plots: self.plots.clone(),
            max_plot_points: self.max_plot_points,
        }
    }
}

// ==================== App State ====================

/// Persistent application state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Version for future migration support
    #[serde(default = "default_app_state_version")]
    pub version: u32,

    /// UI preferences
    #[serde(default)]
    pub ui_preferences: UiPreferences,
}

fn default_app_state_version() -> u32 {
    1
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            version: 1,
            ui_preferences: UiPreferences::default(),
        }
    }
}

impl AppState {
    /// Load app state from the default location
    pub fn load() -> Result<Self> {
        let path = app_state_path().ok_or_else(|| {
            StationVisError::Config("Could not determine app state path".to_string())
        })?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load app state from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| StationVisError::Config(format!("Failed to read app state: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| StationVisError::Config(format!("Failed to parse app state: {}", e)))
    }

    /// Load app state, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load app state, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save app state to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(dir.join(APP_STATE_FILE))
    }

    /// Save app state to a specific file
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| StationVisError::Config(format!("Failed to serialize app state: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| StationVisError::Config(format!("Failed to write app state: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_dashboard_config_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(14));
        assert_eq!(config.timeouts.buckets_timeout(), Duration::from_secs(20));
        assert_eq!(config.bucket_fields.len(), 9);
        assert_eq!(config.plots.len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DASHBOARD_CONFIG_FILE);
        std::fs::write(
            &path,
            r#"
device_url = "http://10.0.0.7"
poll_interval_secs = 30

[timeouts]
buckets_ms = 5000
"#,
        )
        .unwrap();

        let config = DashboardConfig::load_from(&path).unwrap();
        assert_eq!(config.device_url, "http://10.0.0.7");
        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.timeouts.buckets_ms, 5000);
        assert_eq!(config.timeouts.default_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.plots, default_plots());
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DASHBOARD_CONFIG_FILE);

        let mut config = DashboardConfig::default();
        config.max_plot_points = 250;
        config.plots.truncate(2);
        config.save_to(&path).unwrap();

        let loaded = DashboardConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DASHBOARD_CONFIG_FILE);
        std::fs::write(&path, "poll_interval_secs = 0\n").unwrap();

        let err = DashboardConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("poll_interval_secs"));
        assert_eq!(
            DashboardConfig::load_or_default(Some(&path)),
            DashboardConfig::default()
        );
    }

    #[test]
    fn test_app_state_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(APP_STATE_FILE);

        let mut state = AppState::default();
        state.ui_preferences.dark_mode = false;
        state.ui_preferences.set_zoom_preset(3);
        state.save_to(&path).unwrap();

        let loaded = AppState::load_from(&path).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_app_state_parse_error_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(APP_STATE_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        let err = AppState::load_from(&path).unwrap_err();
        assert!(matches!(err, StationVisError::Config(_)));
    }
}
