//! The dashboard context: panes, shared zoom extent, gesture and hover state.
//!
//! Every pane of a [`ChartDashboard`] renders against the same zoom extent.
//! Any change to the extent re-renders all panes before the method returns,
//! so there is never a state where only some panes show the new window.

use crate::chart::axis::WallClock;
use crate::chart::domain::Domain;
use crate::chart::gesture::{Activation, DragPhase, DragSpan, GestureSource, GestureState};
use crate::chart::hover::{self, HoverHit, HoverMarker};
use crate::chart::mapper::Viewport;
use crate::chart::pane::Pane;
use crate::chart::theme::Theme;
use crate::config::{DeviceChartConfig, PlotSpec};
use crate::types::{BucketBatch, Sample, DEFAULT_MAX_PLOT_POINTS};
use std::time::Instant;

/// Narrowest zoom window in seconds; epochs have one-second resolution
pub const MIN_ZOOM_SPAN_SECS: f64 = 1.0;

/// Seconds per zoom preset hour
const SECS_PER_HOUR: f64 = 3600.0;

/// Layout and clock shared by every pane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardOptions {
    pub viewport: Viewport,
    pub max_plot_points: usize,
    pub clock: WallClock,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            max_plot_points: DEFAULT_MAX_PLOT_POINTS,
            clock: WallClock::Local,
        }
    }
}

/// Active drag selection, clamped to the plot area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub pane: usize,
    pub left: f64,
    pub right: f64,
}

/// Reply to a touch event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchResponse {
    /// The host should suppress its default handling (scrolling)
    pub consume_default: bool,
}

/// Multi-pane synchronized chart
#[derive(Debug)]
pub struct ChartDashboard {
    options: DashboardOptions,
    panes: Vec<Pane>,
    zoom: Option<Domain>,
    theme: Theme,
    gesture: GestureState,
    hover: Option<HoverHit>,
    samples: Vec<Sample>,
    device_now: Option<f64>,
    bucket_seconds: Option<u32>,
    active_preset: Option<u32>,
}

impl ChartDashboard {
    pub fn new(plots: Vec<PlotSpec>, options: DashboardOptions) -> Self {
        let mut dashboard = Self {
            options,
            panes: Vec::new(),
            zoom: None,
            theme: Theme::default(),
            gesture: GestureState::new(),
            hover: None,
            samples: Vec::new(),
            device_now: None,
            bucket_seconds: None,
            active_preset: None,
        };
        dashboard.build_panes(plots);
        dashboard
    }

    /// Build from a device chart config, taking its point budget
    pub fn from_chart_config(
        config: &DeviceChartConfig,
        viewport: Viewport,
        clock: WallClock,
    ) -> Self {
        Self::new(
            config.plots.clone(),
            DashboardOptions {
                viewport,
                max_plot_points: config.effective_max_plot_points(),
                clock,
            },
        )
    }

    fn build_panes(&mut self, plots: Vec<PlotSpec>) {
        self.panes = plots
            .into_iter()
            .map(|spec| {
                Pane::new(
                    spec,
                    self.options.viewport,
                    self.options.max_plot_points,
                    self.options.clock,
                )
            })
            .collect();
        for pane in &mut self.panes {
            pane.set_view(self.zoom, self.theme);
        }
    }

    /// Replace the plot layout; the zoom and gesture are reset and the last
    /// samples are handed to the new panes
    pub fn set_plots(&mut self, plots: Vec<PlotSpec>, max_plot_points: usize) {
        self.options.max_plot_points = max_plot_points;
        self.zoom = None;
        self.gesture.cancel();
        self.hover = None;
        self.build_panes(plots);
        let samples = std::mem::take(&mut self.samples);
        self.set_series(samples);
        tracing::info!(panes = self.panes.len(), "Plot layout replaced");
    }

    // ==================== Accessors ====================

    pub fn panes(&self) -> &[Pane] {
        &self.panes
    }

    pub fn pane(&self, index: usize) -> Option<&Pane> {
        self.panes.get(index)
    }

    pub fn pane_index(&self, id: &str) -> Option<usize> {
        self.panes.iter().position(|p| p.id() == id)
    }

    pub fn options(&self) -> &DashboardOptions {
        &self.options
    }

    pub fn zoom_extent(&self) -> Option<Domain> {
        self.zoom
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Whether a reset control should be offered
    pub fn reset_visible(&self) -> bool {
        self.zoom.is_some()
    }

    /// Preset applied last, cleared by a manual zoom or reset
    pub fn active_preset(&self) -> Option<u32> {
        self.active_preset
    }

    pub fn device_now(&self) -> Option<f64> {
        self.device_now
    }

    pub fn bucket_seconds(&self) -> Option<u32> {
        self.bucket_seconds
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_dragging()
    }

    /// Current hover result, if the pointer is over a sample
    pub fn tooltip(&self) -> Option<&HoverHit> {
        self.hover.as_ref()
    }

    /// Highlight to draw on `pane`; only the hovered pane has one
    pub fn highlight_for(&self, pane: usize) -> Option<&HoverMarker> {
        self.hover
            .as_ref()
            .filter(|h| h.pane == pane)
            .and_then(|h| h.marker.as_ref())
    }

    /// Selection rectangle of the active drag
    pub fn selection(&self) -> Option<Selection> {
        match self.gesture.phase() {
            DragPhase::Dragging {
                pane,
                start_x,
                current_x,
                ..
            } => {
                let vp = &self.options.viewport;
                let a = vp.clamp_x(start_x);
                let b = vp.clamp_x(current_x);
                Some(Selection {
                    pane,
                    left: a.min(b),
                    right: a.max(b),
                })
            }
            DragPhase::Idle => None,
        }
    }

    /// Union of the full time domains of all panes
    pub fn full_extent(&self) -> Option<Domain> {
        self.panes
            .iter()
            .filter_map(Pane::full_time_domain)
            .reduce(|a, b| Domain {
                min: a.min.min(b.min),
                max: a.max.max(b.max),
            })
    }

    // ==================== Data ====================

    /// Hand the same samples to every pane
    pub fn set_series(&mut self, samples: Vec<Sample>) {
        self.hover = None;
        for pane in &mut self.panes {
            pane.set_series(&samples);
        }
        tracing::debug!(
            samples = samples.len(),
            with_data = self.panes.iter().filter(|p| p.has_data()).count(),
            "Dashboard refreshed"
        );
        self.samples = samples;
    }

    /// Apply a decoded bucket batch
    pub fn set_batch(&mut self, batch: BucketBatch) {
        self.device_now = batch.now_epoch.map(|e| e as f64);
        if batch.bucket_seconds.is_some() {
            self.bucket_seconds = batch.bucket_seconds;
        }
        self.set_series(batch.samples);
    }

    /// Re-render every pane with the current zoom extent and theme
    pub fn invalidate_all(&mut self) {
        for pane in &mut self.panes {
            pane.set_view(self.zoom, self.theme);
        }
    }

    /// Switch palette; all geometry is recomputed
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.hover = None;
        self.invalidate_all();
    }

    // ==================== Zoom ====================

    /// Set or clear the shared zoom extent and re-render all panes.
    ///
    /// Non-finite bounds are ignored. Windows narrower than
    /// [`MIN_ZOOM_SPAN_SECS`] are widened around their centre.
    pub fn set_zoom_extent(&mut self, extent: Option<Domain>) {
        let extent = match extent {
            None => None,
            Some(d) if d.min.is_finite() && d.max.is_finite() => Some(enforce_min_span(d)),
            Some(d) => {
                tracing::debug!(?d, "Ignoring non-finite zoom extent");
                return;
            }
        };
        self.zoom = extent;
        self.hover = None;
        self.invalidate_all();
    }

    /// Clear the zoom so every pane shows its full extent
    pub fn reset_zoom(&mut self) {
        self.active_preset = None;
        self.set_zoom_extent(None);
    }

    /// Show the last `hours` of data.
    ///
    /// The window ends at `max(now, latest sample)` and is clamped to the
    /// available data. If it would cover all data (or none of it) the zoom
    /// is cleared instead.
    pub fn apply_zoom_preset(&mut self, hours: u32, now: f64) {
        self.active_preset = Some(hours);
        let Some(full) = self.full_extent() else {
            self.set_zoom_extent(None);
            return;
        };

        let end = if now.is_finite() { now.max(full.max) } else { full.max };
        let start = end - hours as f64 * SECS_PER_HOUR;
        let lo = start.max(full.min);
        let hi = end.min(full.max);

        if hi > lo && hi - lo < full.span() {
            self.set_zoom_extent(Some(Domain { min: lo, max: hi }));
        } else {
            self.set_zoom_extent(None);
        }
    }

    fn zoom_to_span(&mut self, span: DragSpan) {
        let Some(dt) = self.panes.get(span.pane).and_then(Pane::visible_time_domain) else {
            return;
        };
        let vp = &self.options.viewport;
        let lo = dt.min + vp.fraction_at(span.left) * dt.span();
        let hi = dt.min + vp.fraction_at(span.right) * dt.span();
        tracing::debug!(pane = span.pane, lo, hi, "Drag zoom");
        self.active_preset = None;
        self.set_zoom_extent(Some(Domain { min: lo, max: hi }));
    }

    // ==================== Pointer input ====================

    /// Primary button pressed at logical `x` on `pane`
    pub fn on_pointer_down(&mut self, pane: usize, x: f64, at: Instant) {
        self.activate(pane, x, GestureSource::Pointer, at);
    }

    /// Pointer moved to logical `x` over `pane`
    pub fn on_pointer_move(&mut self, pane: usize, x: f64) {
        if pane >= self.panes.len() {
            return;
        }
        if self.gesture.is_dragging() {
            self.gesture.update(pane, x);
            self.hover = None;
            return;
        }
        self.hover = hover::hover_at(&self.panes[pane], pane, x);
    }

    /// Primary button released at logical `x` on `pane`
    pub fn on_pointer_up(&mut self, pane: usize, x: f64) {
        let vp = self.options.viewport;
        if let Some(span) = self.gesture.release(pane, Some(x), |v| vp.clamp_x(v)) {
            self.zoom_to_span(span);
        }
    }

    /// Pointer left `pane`; an active drag on it is cancelled
    pub fn on_pointer_leave(&mut self, pane: usize) {
        if self.gesture.owner() == Some(pane) {
            self.gesture.cancel();
        }
        self.hover = None;
    }

    /// Native double-click on `pane`
    pub fn on_double_activate(&mut self, pane: usize) {
        if pane < self.panes.len() {
            self.gesture.cancel();
            self.reset_zoom();
        }
    }

    // ==================== Touch input ====================

    pub fn on_touch_start(&mut self, pane: usize, x: f64, at: Instant) -> TouchResponse {
        let activation = self.activate(pane, x, GestureSource::Touch, at);
        TouchResponse {
            consume_default: matches!(
                activation,
                Some(Activation::DragStarted | Activation::DoubleActivation)
            ) || self.gesture.owner() == Some(pane),
        }
    }

    pub fn on_touch_move(&mut self, pane: usize, x: f64) -> TouchResponse {
        let owned = self.gesture.update(pane, x);
        if owned {
            self.hover = None;
        }
        TouchResponse {
            consume_default: owned,
        }
    }

    pub fn on_touch_end(&mut self, pane: usize, x: Option<f64>) -> TouchResponse {
        let owned = self.gesture.owner() == Some(pane);
        let vp = self.options.viewport;
        if let Some(span) = self.gesture.release(pane, x, |v| vp.clamp_x(v)) {
            self.zoom_to_span(span);
        }
        self.hover = None;
        TouchResponse {
            consume_default: owned,
        }
    }

    pub fn on_touch_cancel(&mut self, pane: usize) -> TouchResponse {
        let owned = self.gesture.owner() == Some(pane);
        if owned {
            self.gesture.cancel();
        }
        self.hover = None;
        TouchResponse {
            consume_default: owned,
        }
    }

    fn activate(
        &mut self,
        pane: usize,
        x: f64,
        source: GestureSource,
        at: Instant,
    ) -> Option<Activation> {
        if pane >= self.panes.len() || !x.is_finite() {
            return None;
        }
        let activation = self.gesture.activate(pane, x, source, at);
        match activation {
            Activation::DragStarted => self.hover = None,
            Activation::DoubleActivation => self.reset_zoom(),
            Activation::Ignored => {}
        }
        Some(activation)
    }
}

fn enforce_min_span(d: Domain) -> Domain {
    let (min, max) = if d.min <= d.max {
        (d.min, d.max)
    } else {
        (d.max, d.min)
    };
    if max - min >= MIN_ZOOM_SPAN_SECS {
        return Domain { min, max };
    }
    let centre = (min + max) / 2.0;
    tracing::debug!(span = max - min, "Zoom window widened to minimum span");
    Domain {
        min: centre - MIN_ZOOM_SPAN_SECS / 2.0,
        max: centre + MIN_ZOOM_SPAN_SECS / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::pane::PaneStatus;
    use crate::config::default_plots;
    use chrono::FixedOffset;
    use std::time::Duration;

    fn options() -> DashboardOptions {
        DashboardOptions {
            clock: WallClock::Fixed(FixedOffset::east_opt(0).unwrap()),
            ..DashboardOptions::default()
        }
    }

    fn hourly(n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| {
                Sample::new(100_000.0 + i as f64 * 600.0)
                    .with("avgWind", 2.0 + (i % 5) as f64)
                    .with("avgTempC", 15.0 + (i % 3) as f64)
            })
            .collect()
    }

    fn loaded() -> ChartDashboard {
        let mut d = ChartDashboard::new(default_plots(), options());
        d.set_series(hourly(48));
        d
    }

    #[test]
    fn test_panes_follow_plot_order() {
        let d = ChartDashboard::new(default_plots(), options());
        assert_eq!(d.panes().len(), 5);
        assert_eq!(d.pane_index("press"), Some(3));
        assert!(d.panes().iter().all(|p| p.status() == PaneStatus::NoData));
    }

    #[test]
    fn test_panes_without_fields_stay_empty() {
        let d = loaded();
        assert_eq!(d.pane(0).unwrap().status(), PaneStatus::Ready);
        assert_eq!(d.pane(1).unwrap().status(), PaneStatus::Ready);
        assert_eq!(d.pane(2).unwrap().status(), PaneStatus::NoData);
    }

    #[test]
    fn test_zoom_applies_to_all_panes() {
        let mut d = loaded();
        let window = Domain {
            min: 105_000.0,
            max: 110_000.0,
        };
        d.set_zoom_extent(Some(window));

        assert!(d.reset_visible());
        for i in [0, 1] {
            let pane = d.pane(i).unwrap();
            assert_eq!(pane.visible_time_domain(), Some(window));
            assert_eq!(pane.status(), PaneStatus::Zoomed);
        }
    }

    #[test]
    fn test_reset_restores_full_domains() {
        let mut d = loaded();
        let before: Vec<_> = d.panes().iter().map(|p| p.visible_time_domain()).collect();

        d.set_zoom_extent(Some(Domain {
            min: 105_000.0,
            max: 110_000.0,
        }));
        d.reset_zoom();

        let after: Vec<_> = d.panes().iter().map(|p| p.visible_time_domain()).collect();
        assert_eq!(before, after);
        assert!(!d.reset_visible());
    }

    #[test]
    fn test_drag_zooms_within_visible_domain() {
        let mut d = loaded();
        let t0 = Instant::now();
        let full = d.pane(0).unwrap().visible_time_domain().unwrap();
        let vp = d.options().viewport;

        let left = vp.x_left() + vp.plot_width() * 0.25;
        let right = vp.x_left() + vp.plot_width() * 0.75;
        d.on_pointer_down(0, left, t0);
        d.on_pointer_move(0, right);
        let sel = d.selection().unwrap();
        assert_eq!((sel.left, sel.right), (left, right));
        d.on_pointer_up(0, right);

        let z = d.zoom_extent().unwrap();
        assert!((z.min - (full.min + 0.25 * full.span())).abs() < 1e-6);
        assert!((z.max - (full.min + 0.75 * full.span())).abs() < 1e-6);
        assert!(d.selection().is_none());

        // a second drag narrows the already zoomed window
        let t1 = t0 + Duration::from_secs(1);
        d.on_pointer_down(0, vp.x_left(), t1);
        d.on_pointer_up(0, vp.x_left() + vp.plot_width() * 0.5);
        let z2 = d.zoom_extent().unwrap();
        assert!((z2.min - z.min).abs() < 1e-6);
        assert!((z2.max - (z.min + 0.5 * z.span())).abs() < 1e-6);
    }

    #[test]
    fn test_short_drag_keeps_zoom() {
        let mut d = loaded();
        d.on_pointer_down(0, 200.0, Instant::now());
        d.on_pointer_up(0, 219.0);
        assert_eq!(d.zoom_extent(), None);
    }

    #[test]
    fn test_double_activation_resets() {
        let mut d = loaded();
        d.set_zoom_extent(Some(Domain {
            min: 105_000.0,
            max: 110_000.0,
        }));
        let t0 = Instant::now();
        d.on_pointer_down(1, 200.0, t0);
        d.on_pointer_up(1, 200.0);
        d.on_pointer_down(1, 200.0, t0 + Duration::from_millis(200));

        assert_eq!(d.zoom_extent(), None);
        assert!(!d.is_dragging());
    }

    #[test]
    fn test_leave_cancels_drag() {
        let mut d = loaded();
        d.on_pointer_down(0, 100.0, Instant::now());
        d.on_pointer_move(0, 400.0);
        d.on_pointer_leave(0);
        d.on_pointer_up(0, 400.0);
        assert_eq!(d.zoom_extent(), None);
    }

    #[test]
    fn test_hover_suppressed_while_dragging() {
        let mut d = loaded();
        d.on_pointer_move(1, 300.0);
        assert!(d.tooltip().is_some());
        assert!(d.highlight_for(1).is_some());
        assert!(d.highlight_for(0).is_none());

        d.on_pointer_down(0, 100.0, Instant::now());
        assert!(d.tooltip().is_none());
        d.on_pointer_move(1, 300.0);
        assert!(d.tooltip().is_none());
        assert_eq!(d.selection().unwrap().pane, 0);
    }

    #[test]
    fn test_touch_consumes_default_only_for_own_gesture() {
        let mut d = loaded();
        let t0 = Instant::now();
        assert!(d.on_touch_start(0, 100.0, t0).consume_default);
        assert!(!d.on_touch_start(1, 100.0, t0).consume_default);
        assert!(d.on_touch_move(0, 300.0).consume_default);
        assert!(!d.on_touch_move(1, 300.0).consume_default);
        assert!(d.on_touch_end(0, None).consume_default);
        assert!(d.zoom_extent().is_some());
    }

    #[test]
    fn test_theme_change_rerenders() {
        let mut d = loaded();
        let before = d.pane(0).unwrap().generation();
        d.set_theme(Theme::Light);
        assert!(d.pane(0).unwrap().generation() > before);
        assert_eq!(d.pane(0).unwrap().geometry().colors, Theme::Light.colors());
    }

    #[test]
    fn test_zoom_preset_window() {
        let mut d = loaded();
        let full = d.full_extent().unwrap();
        d.apply_zoom_preset(1, 0.0);

        let z = d.zoom_extent().unwrap();
        assert_eq!(z.max, full.max);
        assert_eq!(z.min, full.max - 3600.0);
        assert_eq!(d.active_preset(), Some(1));

        // 24h covers the whole 8h of data
        d.apply_zoom_preset(24, 0.0);
        assert_eq!(d.zoom_extent(), None);
    }

    #[test]
    fn test_zoom_preset_ahead_of_data_clears_zoom() {
        let mut d = loaded();
        let full = d.full_extent().unwrap();
        d.apply_zoom_preset(1, full.max + 10.0 * 3600.0);
        assert_eq!(d.zoom_extent(), None);
    }

    #[test]
    fn test_tiny_zoom_widened() {
        let mut d = loaded();
        d.set_zoom_extent(Some(Domain {
            min: 105_000.0,
            max: 105_000.2,
        }));
        let z = d.zoom_extent().unwrap();
        assert!((z.span() - MIN_ZOOM_SPAN_SECS).abs() < 1e-9);
        assert!(((z.min + z.max) / 2.0 - 105_000.1).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_persists_across_refresh() {
        let mut d = loaded();
        let window = Domain {
            min: 105_000.0,
            max: 110_000.0,
        };
        d.set_zoom_extent(Some(window));
        d.set_series(hourly(60));
        assert_eq!(d.pane(0).unwrap().visible_time_domain(), Some(window));
    }

    #[test]
    fn test_set_plots_refeeds_last_samples() {
        let mut d = loaded();
        let mut plots = default_plots();
        plots.truncate(1);
        d.set_plots(plots, 100);
        assert_eq!(d.panes().len(), 1);
        assert_eq!(d.pane(0).unwrap().status(), PaneStatus::Ready);
    }

    #[test]
    fn test_set_batch_records_device_clock() {
        let mut d = ChartDashboard::new(default_plots(), options());
        d.set_batch(BucketBatch {
            now_epoch: Some(130_000),
            bucket_seconds: Some(600),
            samples: hourly(3),
            dropped: 0,
        });
        assert_eq!(d.device_now(), Some(130_000.0));
        assert_eq!(d.bucket_seconds(), Some(600));
        assert!(d.pane(0).unwrap().has_data());
    }
}
