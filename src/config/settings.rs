//! UI preferences that persist between runs
//!
//! Stored inside `app_state.json` (see [`super::AppState`]). Unknown or
//! out-of-range values fall back to defaults instead of failing the load.

use serde::{Deserialize, Serialize};

/// Zoom window presets offered in the toolbar, in hours
pub const ZOOM_PRESETS_HOURS: [u32; 5] = [1, 3, 6, 12, 24];

/// Preset selected on first launch
pub const DEFAULT_ZOOM_PRESET_HOURS: u32 = 24;

/// UI preferences persisted across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiPreferences {
    /// Enable dark mode
    #[serde(default = "default_true")]
    pub dark_mode: bool,

    /// Last chosen zoom preset in hours
    #[serde(default = "default_zoom_preset")]
    pub zoom_preset_hours: u32,
}

fn default_true() -> bool {
    true
}

fn default_zoom_preset() -> u32 {
    DEFAULT_ZOOM_PRESET_HOURS
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            dark_mode: true,
            zoom_preset_hours: DEFAULT_ZOOM_PRESET_HOURS,
        }
    }
}

impl UiPreferences {
    /// The stored preset if it is one of [`ZOOM_PRESETS_HOURS`], else the default
    pub fn zoom_preset(&self) -> u32 {
        if is_zoom_preset(self.zoom_preset_hours) {
            self.zoom_preset_hours
        } else {
            DEFAULT_ZOOM_PRESET_HOURS
        }
    }

    /// Record a preset selection; ignores values outside the preset list
    pub fn set_zoom_preset(&mut self, hours: u32) -> bool {
        if is_zoom_preset(hours) {
            self.zoom_preset_hours = hours;
            true
        } else {
            false
        }
    }
}

/// Whether `hours` is one of the offered presets
pub fn is_zoom_preset(hours: u32) -> bool {
    ZOOM_PRESETS_HOURS.contains(&hours)
}
