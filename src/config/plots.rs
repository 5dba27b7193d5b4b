//! Plot descriptors
//!
//! One [`PlotSpec`] per chart pane. The same shape is served by the device
//! at `/api/config` (camelCase keys) and accepted in the local TOML file
//! (snake_case aliases are also understood).

use crate::chart::theme::SeriesColor;
use crate::types::DEFAULT_MAX_PLOT_POINTS;
use egui::Color32;
use serde::{Deserialize, Serialize};

/// One plotted field inside a pane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSpec {
    /// Sample field this series reads
    pub field: String,

    /// Line color
    pub color: SeriesColor,

    /// Legend and tooltip label
    pub label: String,

    /// Hidden series are not drawn and have no tooltip line
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl SeriesSpec {
    pub fn new(field: impl Into<String>, color: SeriesColor, label: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            color,
            label: label.into(),
            visible: true,
        }
    }
}

/// One chart pane: a metric with its unit and series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotSpec {
    /// Stable pane identifier
    pub id: String,

    /// Title shown above the pane
    pub title: String,

    /// Unit suffix for tooltips and the title
    pub unit: String,

    /// Multiplier applied to every raw value before plotting
    #[serde(default = "default_conversion_factor", alias = "conversion_factor")]
    pub conversion_factor: f64,

    /// Decimal places on the value axis
    #[serde(default = "default_value_decimals", alias = "value_decimals")]
    pub value_decimals: usize,

    /// Series drawn in this pane
    #[serde(default)]
    pub series: Vec<SeriesSpec>,
}

fn default_true() -> bool {
    true
}

fn default_conversion_factor() -> f64 {
    1.0
}

fn default_value_decimals() -> usize {
    1
}

impl PlotSpec {
    /// Fields of the series, in order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.field.as_str())
    }

    /// Conversion factor, treating a non-finite or zero factor as 1.0
    pub fn effective_factor(&self) -> f64 {
        if self.conversion_factor.is_finite() && self.conversion_factor != 0.0 {
            self.conversion_factor
        } else {
            1.0
        }
    }
}

/// Chart configuration as served by the device at `/api/config`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceChartConfig {
    pub plots: Vec<PlotSpec>,

    #[serde(default = "default_max_plot_points")]
    pub max_plot_points: usize,
}

fn default_max_plot_points() -> usize {
    DEFAULT_MAX_PLOT_POINTS
}

impl DeviceChartConfig {
    /// Point budget, where zero means "use the default"
    pub fn effective_max_plot_points(&self) -> usize {
        if self.max_plot_points == 0 {
            DEFAULT_MAX_PLOT_POINTS
        } else {
            self.max_plot_points
        }
    }
}

impl Default for DeviceChartConfig {
    fn default() -> Self {
        Self {
            plots: default_plots(),
            max_plot_points: DEFAULT_MAX_PLOT_POINTS,
        }
    }
}

fn fixed(r: u8, g: u8, b: u8) -> SeriesColor {
    SeriesColor::Fixed(Color32::from_rgb(r, g, b))
}

/// The five panes the station firmware ships with
pub fn default_plots() -> Vec<PlotSpec> {
    let plot = |id: &str, title: &str, unit: &str, factor: f64, series: Vec<SeriesSpec>| PlotSpec {
        id: id.to_string(),
        title: title.to_string(),
        unit: unit.to_string(),
        conversion_factor: factor,
        value_decimals: 1,
        series,
    };

    let mut pressure = plot(
        "press",
        "Pressure (MSLP)",
        "hPa",
        1.0,
        vec![SeriesSpec::new("avgPressHpa", fixed(0x5c, 0xb8, 0x5c), "Pressure")],
    );
    pressure.value_decimals = 0;

    vec![
        plot(
            "wind",
            "Wind Speed",
            "km/h",
            3.6,
            vec![
                SeriesSpec::new("avgWind", SeriesColor::ThemeLine, "Wind"),
                SeriesSpec::new("maxWind", fixed(0xf0, 0xad, 0x4e), "Gust"),
            ],
        ),
        plot(
            "temp",
            "Temperature",
            "°C",
            1.0,
            vec![SeriesSpec::new("avgTempC", fixed(0xd9, 0x53, 0x4f), "Temp")],
        ),
        plot(
            "hum",
            "Humidity",
            "%",
            1.0,
            vec![SeriesSpec::new("avgHumRH", fixed(0x02, 0x75, 0xd8), "Humidity")],
        ),
        pressure,
        plot(
            "pm",
            "Air Quality (PM)",
            "μg/m³",
            1.0,
            vec![
                SeriesSpec::new("avgPM25", fixed(0xff, 0x66, 0x00), "PM2.5"),
                SeriesSpec::new("avgPM10", fixed(0x99, 0x66, 0x33), "PM10"),
                SeriesSpec::new("avgPM1", fixed(0x99, 0x66, 0xcc), "PM1.0"),
            ],
        ),
    ]
}
