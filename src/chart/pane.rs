//! A single chart pane and its rendered geometry.
//!
//! A [`Pane`] owns the points of one plot and the geometry last computed
//! from them. Geometry is rebuilt on every [`Pane::invalidate`] from the
//! series, the shared zoom extent and the theme; nothing is patched in place.

use crate::chart::axis::{self, AxisTick, WallClock};
use crate::chart::domain::{self, Domain, VALUE_PADDING_FRACTION};
use crate::chart::downsample::downsample;
use crate::chart::mapper::{Point, Viewport};
use crate::chart::series::{points_for_plot, PanePoint};
use crate::chart::theme::{Theme, ThemeColors};
use crate::config::PlotSpec;
use crate::types::Sample;
use egui::Color32;

/// Display state of a pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaneStatus {
    /// No qualifying samples; nothing is drawn
    #[default]
    NoData,
    /// Showing the full time extent
    Ready,
    /// Showing a zoomed time window
    Zoomed,
}

/// One drawn series
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    /// Index into the plot's series list
    pub series: usize,
    pub color: Color32,
    pub points: Vec<Point>,
}

/// Everything needed to paint a pane, in logical pixels
#[derive(Debug, Clone, PartialEq)]
pub struct PaneGeometry {
    /// Time window the geometry was computed for
    pub visible_time: Option<Domain>,
    /// Value range of the visible points before padding
    pub data_range: Domain,
    /// Padded value range used for scaling and ticks
    pub value_domain: Domain,
    pub polylines: Vec<Polyline>,
    pub value_ticks: Vec<AxisTick>,
    pub time_ticks: Vec<AxisTick>,
    /// X positions of day boundaries
    pub boundaries: Vec<f64>,
    pub colors: ThemeColors,
}

impl PaneGeometry {
    fn empty(colors: ThemeColors) -> Self {
        Self {
            visible_time: None,
            data_range: Domain::unit(),
            value_domain: Domain::unit(),
            polylines: Vec::new(),
            value_ticks: Vec::new(),
            time_ticks: Vec::new(),
            boundaries: Vec::new(),
            colors,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty() && self.value_ticks.is_empty() && self.time_ticks.is_empty()
    }
}

/// One chart pane
#[derive(Debug, Clone)]
pub struct Pane {
    spec: PlotSpec,
    viewport: Viewport,
    max_plot_points: usize,
    clock: WallClock,
    points: Vec<PanePoint>,
    full_time: Option<Domain>,
    zoom: Option<Domain>,
    theme: Theme,
    geometry: PaneGeometry,
    status: PaneStatus,
    generation: u64,
}

impl Pane {
    pub fn new(spec: PlotSpec, viewport: Viewport, max_plot_points: usize, clock: WallClock) -> Self {
        let theme = Theme::default();
        Self {
            spec,
            viewport,
            max_plot_points,
            clock,
            points: Vec::new(),
            full_time: None,
            zoom: None,
            theme,
            geometry: PaneGeometry::empty(theme.colors()),
            status: PaneStatus::NoData,
            generation: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.spec.id
    }

    pub fn spec(&self) -> &PlotSpec {
        &self.spec
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn clock(&self) -> &WallClock {
        &self.clock
    }

    /// Points that passed filtering, in arrival order
    pub fn points(&self) -> &[PanePoint] {
        &self.points
    }

    /// Time extent of all points, ignoring any zoom
    pub fn full_time_domain(&self) -> Option<Domain> {
        self.full_time
    }

    /// Time window of the current geometry
    pub fn visible_time_domain(&self) -> Option<Domain> {
        self.geometry.visible_time
    }

    pub fn geometry(&self) -> &PaneGeometry {
        &self.geometry
    }

    pub fn status(&self) -> PaneStatus {
        self.status
    }

    pub fn has_data(&self) -> bool {
        !self.points.is_empty()
    }

    /// Incremented on every geometry rebuild
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the series and rebuild geometry.
    ///
    /// Samples without a valid epoch or without any finite tracked value are
    /// dropped. Values are stored with the conversion factor applied.
    pub fn set_series(&mut self, samples: &[Sample]) {
        self.points = points_for_plot(samples, &self.spec);
        self.full_time = domain::time_domain(&self.points);
        tracing::trace!(
            pane = %self.spec.id,
            points = self.points.len(),
            "Series replaced"
        );
        self.invalidate();
    }

    /// Set the zoom extent and theme this pane renders with, then rebuild
    pub(crate) fn set_view(&mut self, zoom: Option<Domain>, theme: Theme) {
        self.zoom = zoom;
        self.theme = theme;
        self.invalidate();
    }

    /// Rebuild geometry from the current series, zoom extent and theme
    pub fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        let colors = self.theme.colors();

        if self.points.is_empty() {
            self.geometry = PaneGeometry::empty(colors);
            self.status = PaneStatus::NoData;
            return;
        }

        let visible_time = self.zoom.or(self.full_time);
        let in_window: Vec<&PanePoint> = match visible_time {
            Some(d) => self.points.iter().filter(|p| d.contains(p.epoch)).collect(),
            None => Vec::new(),
        };
        let visible: Vec<&PanePoint> = if in_window.is_empty() {
            self.points.iter().collect()
        } else {
            in_window
        };

        let drawn: Vec<usize> = self
            .spec
            .series
            .iter()
            .enumerate()
            .filter(|(_, s)| s.visible)
            .map(|(i, _)| i)
            .collect();

        let data_range = domain::value_domain(visible.iter().copied(), &drawn);
        let value_domain = data_range.padded(VALUE_PADDING_FRACTION);
        let render_points = downsample(&visible, self.max_plot_points);

        let polylines = drawn
            .iter()
            .map(|&i| Polyline {
                series: i,
                color: self.spec.series[i].color.resolve(&colors),
                points: self.viewport.project_series(
                    &*render_points,
                    i,
                    visible_time.as_ref(),
                    &value_domain,
                ),
            })
            .collect();

        let (time_ticks, boundaries) = match &visible_time {
            Some(dt) => (
                axis::time_ticks(dt, &self.clock, &self.viewport),
                axis::midnight_boundaries(dt, &self.clock, &self.viewport),
            ),
            None => (Vec::new(), Vec::new()),
        };

        self.geometry = PaneGeometry {
            visible_time,
            data_range,
            value_domain,
            polylines,
            value_ticks: axis::value_ticks(&value_domain, self.spec.value_decimals, &self.viewport),
            time_ticks,
            boundaries,
            colors,
        };
        self.status = if self.zoom.is_some() {
            PaneStatus::Zoomed
        } else {
            PaneStatus::Ready
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::theme::SeriesColor;
    use crate::config::SeriesSpec;
    use chrono::FixedOffset;

    fn utc() -> WallClock {
        WallClock::Fixed(FixedOffset::east_opt(0).unwrap())
    }

    fn wind_spec() -> PlotSpec {
        PlotSpec {
            id: "wind".to_string(),
            title: "Wind Speed".to_string(),
            unit: "km/h".to_string(),
            conversion_factor: 3.6,
            value_decimals: 1,
            series: vec![SeriesSpec::new("wind", SeriesColor::ThemeLine, "Wind")],
        }
    }

    fn wind_pane() -> Pane {
        Pane::new(wind_spec(), Viewport::default(), 500, utc())
    }

    fn scenario() -> Vec<Sample> {
        vec![
            Sample::new(1000.0).with("wind", 5.0),
            Sample::new(1060.0),
            Sample::new(1120.0).with("wind", 7.0),
        ]
    }

    #[test]
    fn test_new_pane_has_no_data() {
        let pane = wind_pane();
        assert_eq!(pane.status(), PaneStatus::NoData);
        assert!(pane.geometry().is_empty());
        assert_eq!(pane.generation(), 0);
    }

    #[test]
    fn test_scenario_gap_and_domains() {
        let mut pane = wind_pane();
        pane.set_series(&scenario());

        assert_eq!(pane.status(), PaneStatus::Ready);
        let g = pane.geometry();
        assert_eq!(g.polylines.len(), 1);
        assert_eq!(g.polylines[0].points.len(), 2);
        assert!((g.data_range.min - 18.0).abs() < 1e-9);
        assert!((g.data_range.max - 25.2).abs() < 1e-9);
        assert!((g.value_domain.min - 17.28).abs() < 1e-9);
        assert!((g.value_domain.max - 25.92).abs() < 1e-9);
        assert_eq!(g.visible_time, Some(Domain { min: 1000.0, max: 1120.0 }));
        assert_eq!(g.value_ticks.len(), 5);
        assert!(!g.time_ticks.is_empty());
    }

    #[test]
    fn test_empty_batch_clears_geometry() {
        let mut pane = wind_pane();
        pane.set_series(&scenario());
        assert!(!pane.geometry().is_empty());

        pane.set_series(&[]);
        assert_eq!(pane.status(), PaneStatus::NoData);
        assert!(pane.geometry().value_ticks.is_empty());
        assert!(pane.geometry().time_ticks.is_empty());
        assert!(pane.geometry().boundaries.is_empty());
        assert!(pane.full_time_domain().is_none());
    }

    #[test]
    fn test_zoom_renormalizes_value_axis() {
        let mut pane = wind_pane();
        let samples: Vec<Sample> = (0..10)
            .map(|i| Sample::new(1000.0 + i as f64 * 60.0).with("wind", i as f64))
            .collect();
        pane.set_series(&samples);
        let full = pane.geometry().data_range;

        pane.set_view(Some(Domain { min: 1000.0, max: 1120.0 }), Theme::Dark);
        assert_eq!(pane.status(), PaneStatus::Zoomed);
        let zoomed = pane.geometry().data_range;
        assert!(zoomed.max < full.max);
        assert!((zoomed.max - 2.0 * 3.6).abs() < 1e-9);
        assert_eq!(pane.geometry().polylines[0].points.len(), 3);
    }

    #[test]
    fn test_empty_zoom_window_falls_back_to_all_points() {
        let mut pane = wind_pane();
        pane.set_series(&scenario());
        pane.set_view(Some(Domain { min: 1001.0, max: 1010.0 }), Theme::Dark);

        let g = pane.geometry();
        assert_eq!(g.polylines[0].points.len(), 2);
        assert!((g.data_range.min - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_theme_change_recolors_primary_line() {
        let mut pane = wind_pane();
        pane.set_series(&scenario());
        let before = pane.generation();
        assert_eq!(
            pane.geometry().polylines[0].color,
            Theme::Dark.colors().primary_line
        );

        pane.set_view(None, Theme::Light);
        assert_eq!(pane.geometry().polylines[0].color, Color32::BLACK);
        assert!(pane.generation() > before);
    }

    #[test]
    fn test_hidden_series_not_drawn() {
        let mut spec = wind_spec();
        spec.series.push(SeriesSpec {
            visible: false,
            ..SeriesSpec::new("gust", SeriesColor::ThemeLine, "Gust")
        });
        let mut pane = Pane::new(spec, Viewport::default(), 500, utc());
        pane.set_series(&[
            Sample::new(1000.0).with("wind", 1.0).with("gust", 100.0),
            Sample::new(1060.0).with("wind", 2.0).with("gust", 200.0),
        ]);

        let g = pane.geometry();
        assert_eq!(g.polylines.len(), 1);
        assert!(g.data_range.max < 10.0);
    }

    #[test]
    fn test_downsampled_polyline() {
        let mut pane = Pane::new(wind_spec(), Viewport::default(), 50, utc());
        let samples: Vec<Sample> = (0..400)
            .map(|i| Sample::new(1000.0 + i as f64).with("wind", (i % 7) as f64))
            .collect();
        pane.set_series(&samples);
        assert_eq!(pane.geometry().polylines[0].points.len(), 50);
        assert_eq!(pane.points().len(), 400);
    }
}
