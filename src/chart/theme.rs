//! Theme palette and series color descriptors.
//!
//! Series colors are parsed once when a plot config is loaded. A color that
//! follows the theme (the primary line color) stays symbolic until geometry
//! is computed, so a theme switch only needs a re-render.

use egui::Color32;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token the device config uses for the theme-following line color
pub const THEME_LINE_TOKEN: &str = "var(--wind-line-color)";

/// Light or dark chart palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn from_dark_mode(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    /// Concrete colors for this theme
    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Dark => ThemeColors {
                axes: Color32::from_rgb(0x99, 0x99, 0x99),
                grid: Color32::from_rgb(0x44, 0x44, 0x44),
                background: Color32::from_rgb(0x33, 0x33, 0x33),
                midnight: Color32::from_rgb(0x66, 0x66, 0x66),
                primary_line: Color32::from_rgb(0xcc, 0xcc, 0xcc),
            },
            Theme::Light => ThemeColors {
                axes: Color32::from_rgb(0x55, 0x55, 0x55),
                grid: Color32::from_rgb(0xdd, 0xdd, 0xdd),
                background: Color32::from_rgb(0xef, 0xef, 0xef),
                midnight: Color32::from_rgb(0xbb, 0xbb, 0xbb),
                primary_line: Color32::BLACK,
            },
        }
    }
}

/// Resolved palette used when building pane geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeColors {
    /// Axis labels and tick text
    pub axes: Color32,
    /// Horizontal grid lines at value ticks
    pub grid: Color32,
    /// Plot area fill
    pub background: Color32,
    /// Day boundary markers
    pub midnight: Color32,
    /// Primary line color (follows the theme)
    pub primary_line: Color32,
}

/// Color of one series, either fixed or following the theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SeriesColor {
    /// Theme's primary line color, resolved at render time
    ThemeLine,
    /// Fixed RGB color
    Fixed(Color32),
}

impl SeriesColor {
    /// Parse `#rgb`, `#rrggbb`, a small set of CSS names, or the theme token
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim();
        if s.eq_ignore_ascii_case(THEME_LINE_TOKEN) {
            return Some(SeriesColor::ThemeLine);
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).map(SeriesColor::Fixed);
        }
        named_color(&s.to_ascii_lowercase()).map(SeriesColor::Fixed)
    }

    pub fn resolve(&self, colors: &ThemeColors) -> Color32 {
        match self {
            SeriesColor::ThemeLine => colors.primary_line,
            SeriesColor::Fixed(c) => *c,
        }
    }
}

impl TryFrom<String> for SeriesColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SeriesColor::parse(&value).ok_or_else(|| format!("unrecognized color '{}'", value))
    }
}

impl From<SeriesColor> for String {
    fn from(value: SeriesColor) -> Self {
        value.to_string()
    }
}

impl fmt::Display for SeriesColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesColor::ThemeLine => f.write_str(THEME_LINE_TOKEN),
            SeriesColor::Fixed(c) => write!(f, "#{:02x}{:02x}{:02x}", c.r(), c.g(), c.b()),
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color32> {
    let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => Some(Color32::from_rgb(
            digit(0)? * 17,
            digit(1)? * 17,
            digit(2)? * 17,
        )),
        6 => Some(Color32::from_rgb(pair(0)?, pair(2)?, pair(4)?)),
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Color32> {
    let rgb = match name {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "brown" => (165, 42, 42),
        "gray" | "grey" => (128, 128, 128),
        "steelblue" => (70, 130, 180),
        _ => return None,
    };
    Some(Color32::from_rgb(rgb.0, rgb.1, rgb.2))
}
