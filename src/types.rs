//! Core data types for StationVis-RS
//!
//! # Main Types
//!
//! - [`Sample`] - One timestamped record with named numeric fields
//! - [`BucketBatch`] - A decoded batch of samples plus the device's clock
//! - [`FetchStatus`] - Outcome of the most recent poll, for the status bar
//!
//! A field that is missing from a sample, or present but non-finite, is a
//! "no reading" and is never coerced to zero anywhere downstream.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default maximum number of points rendered per polyline
pub const DEFAULT_MAX_PLOT_POINTS: usize = 500;

/// Default recency window for bucket batches (24 hours)
pub const DEFAULT_RECENCY_WINDOW_SECS: i64 = 24 * 60 * 60;

/// A single timestamped record from the device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Start of the bucket in Unix seconds
    pub epoch: f64,
    /// Named readings present for this bucket
    pub values: HashMap<String, f64>,
}

impl Sample {
    /// Create an empty sample at the given epoch
    pub fn new(epoch: f64) -> Self {
        Self {
            epoch,
            values: HashMap::new(),
        }
    }

    /// Builder-style setter for a field
    pub fn with(mut self, field: impl Into<String>, value: f64) -> Self {
        self.values.insert(field.into(), value);
        self
    }

    /// Finite reading for `field`, if any
    pub fn value(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied().filter(|v| v.is_finite())
    }

    /// Whether the epoch can be placed on a time axis.
    ///
    /// Epochs that are non-finite or not strictly positive count as
    /// "no timestamp".
    pub fn has_valid_epoch(&self) -> bool {
        self.epoch.is_finite() && self.epoch > 0.0
    }
}

/// A decoded bucket batch ready for the chart engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketBatch {
    /// Device clock at the time of the response, if reported
    pub now_epoch: Option<i64>,
    /// Bucket width in seconds, if reported
    pub bucket_seconds: Option<u32>,
    /// Samples in ascending epoch order
    pub samples: Vec<Sample>,
    /// Number of raw tuples dropped for being malformed
    pub dropped: usize,
}

/// Outcome of the most recent poll
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchStatus {
    /// Nothing fetched yet
    #[default]
    Idle,
    /// Last fetch succeeded
    Ok,
    /// Last fetch hit its deadline
    TimedOut(String),
    /// Last fetch failed for another reason
    Failed(String),
}

impl FetchStatus {
    /// Whether the last fetch failed in any way
    pub fn is_error(&self) -> bool {
        matches!(self, FetchStatus::TimedOut(_) | FetchStatus::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_value_filters_non_finite() {
        let s = Sample::new(1000.0)
            .with("avgWind", 5.0)
            .with("maxWind", f64::NAN)
            .with("avgTempC", f64::INFINITY);

        assert_eq!(s.value("avgWind"), Some(5.0));
        assert_eq!(s.value("maxWind"), None);
        assert_eq!(s.value("avgTempC"), None);
        assert_eq!(s.value("missing"), None);
    }

    #[test]
    fn test_sample_epoch_policy() {
        assert!(Sample::new(1.0).has_valid_epoch());
        assert!(!Sample::new(0.0).has_valid_epoch());
        assert!(!Sample::new(-5.0).has_valid_epoch());
        assert!(!Sample::new(f64::NAN).has_valid_epoch());
    }

    #[test]
    fn test_fetch_status_error() {
        assert!(!FetchStatus::Idle.is_error());
        assert!(!FetchStatus::Ok.is_error());
        assert!(FetchStatus::TimedOut("x".into()).is_error());
        assert!(FetchStatus::Failed("x".into()).is_error());
    }
}
