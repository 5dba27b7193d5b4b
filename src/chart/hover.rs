//! Nearest-sample hover lookup and tooltip layout.
//!
//! Lookups read the geometry the pane last rendered (visible time window and
//! padded value domain) so that highlights line up with what is on screen.

use crate::chart::mapper::Point;
use crate::chart::pane::Pane;
use crate::chart::series::PanePoint;
use egui::Color32;

/// Distance from the pointer to the tooltip's top-left corner
pub const TOOLTIP_OFFSET: f64 = 15.0;

/// Minimum gap kept between the tooltip and the container edge
pub const TOOLTIP_EDGE_MARGIN: f64 = 5.0;

/// One row of tooltip text
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipLine {
    pub text: String,
    pub color: Color32,
}

/// Tooltip content for a matched sample
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    /// Epoch of the matched sample
    pub epoch: f64,
    /// `@ HH:MM` of the matched sample
    pub time_label: String,
    pub lines: Vec<TooltipLine>,
}

/// A highlighted value on the hover line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerDot {
    pub point: Point,
    pub color: Color32,
}

/// Vertical hover line plus one dot per finite value
#[derive(Debug, Clone, PartialEq)]
pub struct HoverMarker {
    pub x: f64,
    pub dots: Vec<MarkerDot>,
}

/// Result of a hover query on one pane
#[derive(Debug, Clone, PartialEq)]
pub struct HoverHit {
    pub pane: usize,
    /// Index of the matched point in the pane's series
    pub index: usize,
    pub tooltip: Tooltip,
    /// Absent when the matched epoch lies outside the plot area
    pub marker: Option<HoverMarker>,
}

/// Index of the point nearest to `target` among points with a finite value.
///
/// Ties keep the earlier point. Without a target the first eligible point
/// is returned.
pub fn nearest_point(points: &[PanePoint], target: Option<f64>) -> Option<usize> {
    let mut eligible = points
        .iter()
        .enumerate()
        .filter(|(_, p)| p.has_any_value());

    let Some(target) = target.filter(|t| t.is_finite()) else {
        return eligible.next().map(|(i, _)| i);
    };

    let mut best: Option<(usize, f64)> = None;
    for (i, p) in eligible {
        let dist = (p.epoch - target).abs();
        if !dist.is_finite() {
            continue;
        }
        match best {
            Some((_, d)) if dist >= d => {}
            _ => best = Some((i, dist)),
        }
    }
    best.map(|(i, _)| i)
}

/// Hover lookup for logical X position `x` over `pane`
pub fn hover_at(pane: &Pane, pane_index: usize, x: f64) -> Option<HoverHit> {
    if !pane.has_data() || !x.is_finite() {
        return None;
    }
    let geometry = pane.geometry();
    let vp = pane.viewport();
    let target = geometry.visible_time.map(|dt| vp.epoch_at(x, &dt));

    let index = nearest_point(pane.points(), target)?;
    let point = &pane.points()[index];
    let spec = pane.spec();
    let colors = &geometry.colors;

    let lines = spec
        .series
        .iter()
        .enumerate()
        .filter(|(_, s)| s.visible)
        .map(|(i, s)| {
            let value = point
                .value(i)
                .map(|v| format!("{:.1}", v))
                .unwrap_or_else(|| "--".to_string());
            TooltipLine {
                text: format!("{}: {} {}", s.label, value, spec.unit),
                color: s.color.resolve(colors),
            }
        })
        .collect();

    let tooltip = Tooltip {
        epoch: point.epoch,
        time_label: format!("@ {}", pane.clock().format_hhmm(point.epoch)),
        lines,
    };

    let marker = geometry.visible_time.and_then(|dt| {
        let line_x = vp.map_x(point.epoch, &dt);
        if !(line_x >= vp.x_left() && line_x <= vp.x_right()) {
            return None;
        }
        let dots = spec
            .series
            .iter()
            .enumerate()
            .filter(|(_, s)| s.visible)
            .filter_map(|(i, s)| {
                let y = vp.map_y(point.value(i)?, &geometry.value_domain);
                y.is_finite().then(|| MarkerDot {
                    point: Point::new(line_x, y),
                    color: s.color.resolve(colors),
                })
            })
            .collect();
        Some(HoverMarker { x: line_x, dots })
    });

    Some(HoverHit {
        pane: pane_index,
        index,
        tooltip,
        marker,
    })
}

/// Top-left corner for a tooltip of `size` next to `pointer`.
///
/// Placed below-right of the pointer; flipped to the left or above when it
/// would come within [`TOOLTIP_EDGE_MARGIN`] of the container's far edge.
pub fn place_tooltip(pointer: (f64, f64), size: (f64, f64), container: (f64, f64)) -> (f64, f64) {
    let (px, py) = pointer;
    let (w, h) = size;
    let (cw, ch) = container;

    let mut x = px + TOOLTIP_OFFSET;
    if x + w > cw - TOOLTIP_EDGE_MARGIN {
        x = px - w - TOOLTIP_OFFSET;
    }
    let mut y = py + TOOLTIP_OFFSET;
    if y + h > ch - TOOLTIP_EDGE_MARGIN {
        y = py - h - TOOLTIP_OFFSET;
    }
    (x, y)
}
