//! Numeric and temporal ranges over sample batches.
//!
//! Nothing here fails: an empty or all-invalid input yields the default
//! value domain `{0, 1}` or an absent time domain.

use crate::chart::series::PanePoint;
use crate::types::Sample;

/// Spans narrower than this are widened to avoid zero-division when scaling
pub const DOMAIN_EPSILON: f64 = 1e-3;

/// Amount added to `max` when a span is below [`DOMAIN_EPSILON`]
pub const DEGENERATE_WIDENING: f64 = 1.0;

/// Fraction of the span added above and below a value domain before scaling
pub const VALUE_PADDING_FRACTION: f64 = 0.1;

/// An inclusive range; `max >= min` always holds for constructed domains
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    /// Build a domain, ordering the bounds and widening degenerate spans
    pub fn new(a: f64, b: f64) -> Self {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        Self { min, max }.widened()
    }

    /// Default value domain when no finite readings exist
    pub fn unit() -> Self {
        Self { min: 0.0, max: 1.0 }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    /// Value domain over the finite values of an iterator
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        match min_max(values.into_iter().filter(|v| v.is_finite())) {
            Some((min, max)) => Self { min, max }.widened(),
            None => Self::unit(),
        }
    }

    /// Time domain over epochs that are finite and strictly positive
    pub fn from_epochs(epochs: impl IntoIterator<Item = f64>) -> Option<Self> {
        min_max(epochs.into_iter().filter(|e| e.is_finite() && *e > 0.0))
            .map(|(min, max)| Self { min, max }.widened())
    }

    /// Widen by 10% of the span on both sides (or by 1.0 for a zero span)
    pub fn padded(&self, fraction: f64) -> Self {
        let span = self.span();
        let pad = if span > 0.0 { span * fraction } else { 1.0 };
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    fn widened(self) -> Self {
        if (self.max - self.min).abs() < DOMAIN_EPSILON {
            Self {
                min: self.min,
                max: self.min + DEGENERATE_WIDENING,
            }
        } else {
            self
        }
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Value domain over the given series indices of a pane's points
pub fn value_domain<'a>(
    points: impl IntoIterator<Item = &'a PanePoint>,
    series: &[usize],
) -> Domain {
    Domain::from_values(
        points
            .into_iter()
            .flat_map(|p| series.iter().filter_map(move |&i| p.value(i))),
    )
}

/// Time domain over a pane's points
pub fn time_domain<'a>(points: impl IntoIterator<Item = &'a PanePoint>) -> Option<Domain> {
    Domain::from_epochs(points.into_iter().map(|p| p.epoch))
}

/// Value domain over named fields of raw samples
pub fn value_domain_of_samples(samples: &[Sample], fields: &[&str]) -> Domain {
    Domain::from_values(
        samples
            .iter()
            .flat_map(|s| fields.iter().filter_map(move |f| s.value(f))),
    )
}

/// Time domain over raw samples
pub fn time_domain_of_samples(samples: &[Sample]) -> Option<Domain> {
    Domain::from_epochs(samples.iter().map(|s| s.epoch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_value_domain_skips_missing() {
        let samples = vec![
            Sample::new(1000.0).with("wind", 5.0),
            Sample::new(1060.0),
            Sample::new(1120.0).with("wind", 7.0).with("gust", f64::NAN),
        ];
        let d = value_domain_of_samples(&samples, &["wind", "gust"]);
        assert_eq!(d, Domain { min: 5.0, max: 7.0 });
    }

    #[test]
    fn test_value_domain_empty_defaults_to_unit() {
        let d = value_domain_of_samples(&[], &["wind"]);
        assert_eq!(d, Domain::unit());

        let only_nan = vec![Sample::new(1.0).with("wind", f64::NAN)];
        assert_eq!(value_domain_of_samples(&only_nan, &["wind"]), Domain::unit());
    }

    #[test]
    fn test_degenerate_span_widened() {
        let d = Domain::from_values([3.0, 3.0, 3.0005]);
        assert_eq!(d.min, 3.0);
        assert_eq!(d.max, 4.0);
    }

    #[test]
    fn test_time_domain_excludes_non_positive_epochs() {
        let samples = vec![
            Sample::new(0.0),
            Sample::new(-10.0),
            Sample::new(f64::NAN),
            Sample::new(2000.0),
            Sample::new(1500.0),
        ];
        let d = time_domain_of_samples(&samples).unwrap();
        assert_eq!(d, Domain { min: 1500.0, max: 2000.0 });
    }

    #[test]
    fn test_time_domain_absent_without_valid_epochs() {
        assert!(time_domain_of_samples(&[]).is_none());
        assert!(time_domain_of_samples(&[Sample::new(0.0)]).is_none());
    }

    #[test]
    fn test_single_epoch_widened() {
        let d = time_domain_of_samples(&[Sample::new(500.0)]).unwrap();
        assert_eq!(d, Domain { min: 500.0, max: 501.0 });
    }

    #[test]
    fn test_padding() {
        let d = Domain { min: 18.0, max: 25.2 }.padded(VALUE_PADDING_FRACTION);
        assert!((d.min - 17.28).abs() < 1e-9);
        assert!((d.max - 25.92).abs() < 1e-9);

        let flat = Domain { min: 2.0, max: 2.0 }.padded(VALUE_PADDING_FRACTION);
        assert_eq!(flat, Domain { min: 1.0, max: 3.0 });
    }

    #[test]
    fn test_new_orders_bounds() {
        let d = Domain::new(10.0, 2.0);
        assert_eq!(d, Domain { min: 2.0, max: 10.0 });
    }

    proptest! {
        #[test]
        fn prop_domain_is_ordered_and_wide_enough(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..64)) {
            let d = Domain::from_values(values.iter().copied());
            prop_assert!(d.max >= d.min);
            let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            if hi - lo < DOMAIN_EPSILON {
                prop_assert!(d.span() >= 1.0 - 1e-9);
            } else {
                prop_assert_eq!(d.min, lo);
                prop_assert_eq!(d.max, hi);
            }
        }
    }
}
