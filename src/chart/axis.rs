//! Axis ticks and day boundary markers.
//!
//! Labels use the local wall clock. Tests pin the clock to a fixed offset
//! through [`WallClock::Fixed`] so results do not depend on the host zone.

use crate::chart::domain::Domain;
use crate::chart::mapper::Viewport;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone};

/// Intervals on the value axis (one more label than this)
pub const VALUE_TICK_INTERVALS: usize = 4;

/// Approximate number of time ticks across the visible domain
pub const TIME_TICK_TARGET: f64 = 10.0;

/// Upper bound on emitted time ticks
const MAX_TIME_TICKS: usize = 64;

/// Upper bound on emitted day boundaries
const MAX_BOUNDARIES: usize = 400;

/// Most decimals a value label will show
const MAX_VALUE_DECIMALS: usize = 6;

/// A labelled tick. `pos` is Y for value ticks and X for time ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub pos: f64,
    pub value: f64,
    pub label: String,
}

/// Time zone used for tick labels and midnight boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WallClock {
    /// Host local time
    #[default]
    Local,
    /// A fixed UTC offset
    Fixed(FixedOffset),
}

impl WallClock {
    /// Zero-padded `HH:MM` for an epoch, or `--:--` when it cannot be placed
    pub fn format_hhmm(&self, epoch: f64) -> String {
        let label = match self {
            WallClock::Local => hhmm(&Local, epoch),
            WallClock::Fixed(offset) => hhmm(offset, epoch),
        };
        label.unwrap_or_else(|| "--:--".to_string())
    }

    /// First local midnight strictly after `epoch`
    pub fn next_midnight_after(&self, epoch: f64) -> Option<f64> {
        match self {
            WallClock::Local => next_midnight(&Local, epoch),
            WallClock::Fixed(offset) => next_midnight(offset, epoch),
        }
    }
}

fn to_datetime<Tz: TimeZone>(tz: &Tz, epoch: f64) -> Option<DateTime<Tz>> {
    if !epoch.is_finite() || epoch.abs() > 1.0e12 {
        return None;
    }
    tz.timestamp_opt(epoch.floor() as i64, 0).single()
}

fn hhmm<Tz: TimeZone>(tz: &Tz, epoch: f64) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    to_datetime(tz, epoch).map(|dt| dt.format("%H:%M").to_string())
}

/// Start of `date` in `tz`; when midnight falls in a DST gap the first hour
/// after it is used instead
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<f64> {
    [0, 1]
        .iter()
        .filter_map(|&h| date.and_hms_opt(h, 0, 0))
        .find_map(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|dt| dt.timestamp() as f64)
}

fn next_midnight<Tz: TimeZone>(tz: &Tz, epoch: f64) -> Option<f64> {
    let mut date = to_datetime(tz, epoch)?.date_naive();
    for _ in 0..3 {
        if let Some(m) = start_of_day(tz, date) {
            if m > epoch {
                return Some(m);
            }
        }
        date = date.succ_opt()?;
    }
    None
}

/// Value axis ticks from `max` (top) down to `min` (bottom)
pub fn value_ticks(dv: &Domain, decimals: usize, vp: &Viewport) -> Vec<AxisTick> {
    if !(dv.min.is_finite() && dv.max.is_finite()) {
        return Vec::new();
    }
    let decimals = decimals.min(MAX_VALUE_DECIMALS);
    let span = dv.span();

    (0..=VALUE_TICK_INTERVALS)
        .map(|i| {
            let frac = i as f64 / VALUE_TICK_INTERVALS as f64;
            let value = dv.max - frac * span;
            AxisTick {
                pos: vp.y_top() + frac * vp.plot_height(),
                value,
                label: format!("{:.*}", decimals, value),
            }
        })
        .collect()
}

/// Seconds between time ticks for a domain span
pub fn time_tick_spacing(span: f64) -> f64 {
    (span / TIME_TICK_TARGET).round().max(1.0)
}

/// Time axis ticks at multiples of [`time_tick_spacing`]
pub fn time_ticks(dt: &Domain, clock: &WallClock, vp: &Viewport) -> Vec<AxisTick> {
    if !(dt.min.is_finite() && dt.max.is_finite()) || dt.span() <= 0.0 {
        return Vec::new();
    }
    let tick = time_tick_spacing(dt.span());
    let first = (dt.min / tick).ceil() * tick;

    (0..MAX_TIME_TICKS)
        .map(|k| first + k as f64 * tick)
        .take_while(|t| *t <= dt.max + 1.0)
        .map(|t| AxisTick {
            pos: vp.map_x(t, dt),
            value: t,
            label: clock.format_hhmm(t),
        })
        .collect()
}

/// Epochs of every local midnight inside the domain
pub fn midnights_within(dt: &Domain, clock: &WallClock) -> Vec<f64> {
    let mut out = Vec::new();
    let mut next = clock.next_midnight_after(dt.min);
    while let Some(m) = next {
        if m > dt.max || out.len() >= MAX_BOUNDARIES {
            break;
        }
        out.push(m);
        next = clock.next_midnight_after(m);
    }
    out
}

/// X positions of the day boundaries that fall inside the plot area
pub fn midnight_boundaries(dt: &Domain, clock: &WallClock, vp: &Viewport) -> Vec<f64> {
    if dt.span() <= 0.0 {
        return Vec::new();
    }
    midnights_within(dt, clock)
        .into_iter()
        .map(|m| vp.map_x(m, dt))
        .filter(|x| *x >= vp.x_left() && *x <= vp.x_right())
        .collect()
}
