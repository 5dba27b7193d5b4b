//! Coordinate mapping between data space and the logical pane viewport.
//!
//! All geometry is computed in a fixed logical viewport (600 x 140 by
//! default). [`RenderScale`] stretches it onto whatever rectangle the pane
//! occupies on screen and converts pointer positions back.

use crate::chart::domain::Domain;
use crate::chart::series::PanePoint;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// A point in logical pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Logical pane dimensions with space reserved for the axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pad_left: f64,
    pub pad_right: f64,
    pub pad_top: f64,
    pub pad_bottom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 140.0,
            pad_left: 60.0,
            pad_right: 10.0,
            pad_top: 8.0,
            pad_bottom: 26.0,
        }
    }
}

impl Viewport {
    pub fn x_left(&self) -> f64 {
        self.pad_left
    }

    pub fn x_right(&self) -> f64 {
        self.width - self.pad_right
    }

    pub fn y_top(&self) -> f64 {
        self.pad_top
    }

    pub fn y_bottom(&self) -> f64 {
        self.height - self.pad_bottom
    }

    pub fn plot_width(&self) -> f64 {
        self.x_right() - self.x_left()
    }

    pub fn plot_height(&self) -> f64 {
        self.y_bottom() - self.y_top()
    }

    /// Whether the paddings leave a positive plot area
    pub fn is_usable(&self) -> bool {
        [
            self.width,
            self.height,
            self.pad_left,
            self.pad_right,
            self.pad_top,
            self.pad_bottom,
        ]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0)
            && self.plot_width() > 0.0
            && self.plot_height() > 0.0
    }

    /// Clamp an X coordinate to the plot area
    pub fn clamp_x(&self, x: f64) -> f64 {
        x.clamp(self.x_left(), self.x_right())
    }

    /// Fraction of the plot width at `x`, clamped to `[0, 1]`
    pub fn fraction_at(&self, x: f64) -> f64 {
        ((x - self.x_left()) / self.plot_width()).clamp(0.0, 1.0)
    }

    /// X for an epoch inside a time domain
    pub fn map_x(&self, epoch: f64, dt: &Domain) -> f64 {
        self.x_left() + ((epoch - dt.min) / dt.span()) * self.plot_width()
    }

    /// Y for a value inside a value domain; larger values map higher up
    pub fn map_y(&self, v: f64, dv: &Domain) -> f64 {
        self.y_bottom() - ((v - dv.min) / dv.span()) * self.plot_height()
    }

    /// Epoch under `x`, with the fraction clamped to the plot area
    pub fn epoch_at(&self, x: f64, dt: &Domain) -> f64 {
        dt.min + self.fraction_at(x) * dt.span()
    }

    /// Vertices of one series.
    ///
    /// X is epoch-driven when a time domain with a positive span is given
    /// and the point's epoch is valid; otherwise the point is placed by its
    /// index. Points without a finite value for `series` are left out.
    pub fn project_series<P: Borrow<PanePoint>>(
        &self,
        points: &[P],
        series: usize,
        dt: Option<&Domain>,
        dv: &Domain,
    ) -> Vec<Point> {
        let n = points.len();
        let time = dt.filter(|d| d.span() > 0.0 && d.span().is_finite());

        points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| {
                let p = p.borrow();
                let v = p.value(series)?;
                let x = match time {
                    Some(d) if p.has_valid_epoch() => self.map_x(p.epoch, d),
                    _ => self.index_x(i, n),
                };
                let y = self.map_y(v, dv);
                (x.is_finite() && y.is_finite()).then(|| Point::new(x, y))
            })
            .collect()
    }

    fn index_x(&self, i: usize, n: usize) -> f64 {
        if n <= 1 {
            self.x_left()
        } else {
            self.x_left() + (i as f64 / (n - 1) as f64) * self.plot_width()
        }
    }
}

/// Mapping from the logical viewport onto an on-screen rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderScale {
    /// Screen position of the logical origin
    pub origin_x: f64,
    pub origin_y: f64,
    /// Screen pixels per logical pixel
    pub sx: f64,
    pub sy: f64,
}

impl RenderScale {
    /// Scale that stretches `viewport` onto the given screen rectangle
    pub fn fit(viewport: &Viewport, left: f64, top: f64, width: f64, height: f64) -> Self {
        let ratio = |screen: f64, logical: f64| {
            if screen.is_finite() && screen > 0.0 && logical > 0.0 {
                screen / logical
            } else {
                1.0
            }
        };
        Self {
            origin_x: left,
            origin_y: top,
            sx: ratio(width, viewport.width),
            sy: ratio(height, viewport.height),
        }
    }

    pub fn to_screen(&self, p: Point) -> Point {
        Point::new(self.origin_x + p.x * self.sx, self.origin_y + p.y * self.sy)
    }

    pub fn to_logical(&self, screen_x: f64, screen_y: f64) -> Point {
        Point::new(
            (screen_x - self.origin_x) / self.sx,
            (screen_y - self.origin_y) / self.sy,
        )
    }
}
