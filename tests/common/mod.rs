//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use chrono::FixedOffset;
use stationvis_rs::chart::{ChartDashboard, DashboardOptions, WallClock};
use stationvis_rs::config::default_plots;
use std::time::Duration;

/// Create a test timeout duration
pub fn test_timeout() -> Duration {
    Duration::from_secs(5)
}

/// UTC wall clock so labels and midnights do not depend on the host zone
pub fn utc() -> WallClock {
    WallClock::Fixed(FixedOffset::east_opt(0).unwrap())
}

/// Dashboard with the default plot layout and a UTC clock
pub fn dashboard() -> ChartDashboard {
    ChartDashboard::new(
        default_plots(),
        DashboardOptions {
            clock: utc(),
            ..DashboardOptions::default()
        },
    )
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}
