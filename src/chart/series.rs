//! Per-pane series points
//!
//! A pane keeps its samples as [`PanePoint`]s: the epoch plus one optional
//! value per configured series, with the plot's conversion factor applied.

use crate::config::PlotSpec;
use crate::types::Sample;

/// One sample as seen by a pane
#[derive(Debug, Clone, PartialEq)]
pub struct PanePoint {
    pub epoch: f64,
    /// One entry per series of the plot, in series order
    pub values: Vec<Option<f64>>,
}

impl PanePoint {
    /// Finite value of series `index`, if any
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten().filter(|v| v.is_finite())
    }

    /// Whether at least one series has a finite reading
    pub fn has_any_value(&self) -> bool {
        self.values.iter().flatten().any(|v| v.is_finite())
    }

    pub fn has_valid_epoch(&self) -> bool {
        self.epoch.is_finite() && self.epoch > 0.0
    }
}

/// Convert samples for one plot, keeping only points the pane can draw
///
/// A point survives when its epoch is valid and at least one tracked field
/// has a finite reading. Values are multiplied by the plot's factor; a
/// product that overflows to infinity is a missing reading.
pub fn points_for_plot(samples: &[Sample], plot: &PlotSpec) -> Vec<PanePoint> {
    let factor = plot.effective_factor();
    samples
        .iter()
        .filter(|s| s.has_valid_epoch())
        .map(|s| PanePoint {
            epoch: s.epoch,
            values: plot
                .series
                .iter()
                .map(|spec| {
                    s.value(&spec.field)
                        .map(|v| v * factor)
                        .filter(|v| v.is_finite())
                })
                .collect(),
        })
        .filter(PanePoint::has_any_value)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_plots;

    #[test]
    fn test_points_apply_factor_and_filter() {
        let wind = default_plots().remove(0);
        let samples = vec![
            Sample::new(1000.0).with("avgWind", 5.0),
            Sample::new(1060.0).with("avgTempC", 20.0),
            Sample::new(1120.0).with("avgWind", 7.0).with("maxWind", 9.0),
            Sample::new(0.0).with("avgWind", 1.0),
        ];

        let points = points_for_plot(&samples, &wind);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].epoch, 1000.0);
        assert!((points[0].value(0).unwrap() - 18.0).abs() < 1e-9);
        assert_eq!(points[0].value(1), None);
        assert!((points[1].value(1).unwrap() - 32.4).abs() < 1e-9);
    }

    #[test]
    fn test_overflowing_product_is_missing() {
        let mut plot = default_plots().remove(1);
        plot.conversion_factor = f64::MAX;
        let samples = vec![Sample::new(10.0).with("avgTempC", 10.0)];
        assert!(points_for_plot(&samples, &plot).is_empty());
    }

    #[test]
    fn test_value_out_of_range_index() {
        let p = PanePoint {
            epoch: 1.0,
            values: vec![Some(1.0)],
        };
        assert_eq!(p.value(3), None);
        assert!(p.has_any_value());
    }
}
