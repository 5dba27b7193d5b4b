//! Decoding of the device's compact bucket format
//!
//! `/api/buckets_compact` answers with
//! `{"now_epoch": N, "bucket_seconds": S, "buckets": [[epoch, v1, v2, ...], ...]}`.
//! Values are positional; their names come from the configured bucket
//! field list. The firmware sometimes emits sparse arrays (`[1,,2]`,
//! `[1,2,]`), which are tidied up before parsing.

use crate::error::{Result, ResultExt, StationVisError};
use crate::types::{BucketBatch, Sample};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Shortest tuple accepted: epoch plus six readings
pub const MIN_TUPLE_LEN: usize = 7;

/// Sparse-array cleanup rules, applied in order
static SPARSE_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r",(\s*,)+", ","),
        (r",(\s*)\]", "$1]"),
        (r"\[(\s*),", "[$1"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Some((Regex::new(pattern).ok()?, replacement)))
    .collect()
});

#[derive(Debug, Deserialize)]
struct RawBucketResponse {
    #[serde(default)]
    now_epoch: Option<f64>,
    #[serde(default)]
    bucket_seconds: Option<f64>,
    #[serde(default)]
    buckets: Value,
}

/// Remove empty array slots left behind by the firmware's JSON writer.
///
/// `,,` runs collapse to a single comma, and commas directly after `[` or
/// directly before `]` are dropped. Well-formed input is returned borrowed.
pub fn clean_sparse_json(text: &str) -> Cow<'_, str> {
    let mut out = Cow::Borrowed(text);
    for (re, replacement) in SPARSE_RULES.iter() {
        if re.is_match(&out) {
            out = Cow::Owned(re.replace_all(&out, *replacement).into_owned());
        }
    }
    out
}

/// Decode a `buckets_compact` response.
///
/// * `fields` names positions 1.. of every tuple; extra positions are ignored
/// * tuples shorter than [`MIN_TUPLE_LEN`] (or not arrays) are dropped one by one
/// * `null` and non-numeric entries become absent fields, never zero
/// * samples older than `now - recency_window_secs` are dropped, where
///   `now` is the device clock or `local_now` when the device omits it
pub fn decode_buckets(
    text: &str,
    fields: &[String],
    recency_window_secs: i64,
    local_now: i64,
) -> Result<BucketBatch> {
    let cleaned = clean_sparse_json(text);
    let raw: RawBucketResponse = serde_json::from_str(&cleaned)
        .map_err(StationVisError::from)
        .context("Failed to decode bucket response")?;

    let now_epoch = raw
        .now_epoch
        .filter(|n| n.is_finite() && *n > 0.0)
        .map(|n| n as i64);
    let bucket_seconds = raw
        .bucket_seconds
        .filter(|s| s.is_finite() && *s >= 1.0 && *s <= u32::MAX as f64)
        .map(|s| s as u32);

    let cutoff = (now_epoch.unwrap_or(local_now) - recency_window_secs) as f64;

    let tuples: &[Value] = match &raw.buckets {
        Value::Array(items) => items,
        Value::Null => &[],
        other => {
            tracing::warn!("Bucket list is not an array: {}", type_name(other));
            &[]
        }
    };

    let mut dropped = 0;
    let mut stale = 0;
    let mut samples = Vec::with_capacity(tuples.len());
    for tuple in tuples {
        let Some(sample) = decode_tuple(tuple, fields) else {
            dropped += 1;
            continue;
        };
        if sample.epoch.is_nan() || sample.epoch < cutoff {
            stale += 1;
            continue;
        }
        samples.push(sample);
    }

    tracing::debug!(
        samples = samples.len(),
        dropped,
        stale,
        bucket_seconds,
        "Decoded bucket batch"
    );

    Ok(BucketBatch {
        now_epoch,
        bucket_seconds,
        samples,
        dropped,
    })
}

fn decode_tuple(tuple: &Value, fields: &[String]) -> Option<Sample> {
    let items = tuple.as_array().filter(|a| a.len() >= MIN_TUPLE_LEN)?;
    let epoch = items[0].as_f64().unwrap_or(f64::NAN);

    let mut sample = Sample::new(epoch);
    for (name, value) in fields.iter().zip(&items[1..]) {
        if let Some(v) = value.as_f64().filter(|v| v.is_finite()) {
            sample.values.insert(name.clone(), v);
        }
    }
    Some(sample)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
