//! Test data builders for creating test objects

use stationvis_rs::types::{BucketBatch, Sample};

/// Builder for a `buckets_compact` response body
pub struct BucketJsonBuilder {
    now_epoch: Option<i64>,
    bucket_seconds: Option<u32>,
    tuples: Vec<String>,
}

impl BucketJsonBuilder {
    pub fn new() -> Self {
        Self {
            now_epoch: None,
            bucket_seconds: None,
            tuples: Vec::new(),
        }
    }

    pub fn now(mut self, epoch: i64) -> Self {
        self.now_epoch = Some(epoch);
        self
    }

    pub fn bucket_seconds(mut self, seconds: u32) -> Self {
        self.bucket_seconds = Some(seconds);
        self
    }

    /// Raw tuple text, e.g. `"[1000,1,2,3,4,5,6]"`
    pub fn raw_tuple(mut self, tuple: &str) -> Self {
        self.tuples.push(tuple.to_string());
        self
    }

    /// A full tuple with `avg_wind` (m/s) and `temp` set; other fields null
    pub fn reading(self, epoch: i64, avg_wind: Option<f64>, temp: Option<f64>) -> Self {
        let fmt = |v: Option<f64>| v.map_or("null".to_string(), |v| v.to_string());
        let tuple = format!(
            "[{},{},null,12,{},null,null,null,null,null]",
            epoch,
            fmt(avg_wind),
            fmt(temp)
        );
        self.raw_tuple(&tuple)
    }

    pub fn build(self) -> String {
        let mut fields = Vec::new();
        if let Some(now) = self.now_epoch {
            fields.push(format!("\"now_epoch\":{}", now));
        }
        if let Some(s) = self.bucket_seconds {
            fields.push(format!("\"bucket_seconds\":{}", s));
        }
        fields.push(format!("\"buckets\":[{}]", self.tuples.join(",")));
        format!("{{{}}}", fields.join(","))
    }
}

impl Default for BucketJsonBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for decoded batches
pub struct BatchBuilder {
    batch: BucketBatch,
}

impl BatchBuilder {
    pub fn new() -> Self {
        Self {
            batch: BucketBatch::default(),
        }
    }

    pub fn now(mut self, epoch: i64) -> Self {
        self.batch.now_epoch = Some(epoch);
        self
    }

    pub fn bucket_seconds(mut self, seconds: u32) -> Self {
        self.batch.bucket_seconds = Some(seconds);
        self
    }

    pub fn sample(mut self, sample: Sample) -> Self {
        self.batch.samples.push(sample);
        self
    }

    /// `count` samples `step` seconds apart starting at `start`, with a
    /// wind and temperature reading each
    pub fn series(mut self, start: f64, step: f64, count: usize) -> Self {
        for i in 0..count {
            self.batch.samples.push(
                Sample::new(start + i as f64 * step)
                    .with("avgWind", 1.0 + (i % 4) as f64)
                    .with("avgTempC", 10.0 + (i % 6) as f64),
            );
        }
        self
    }

    pub fn build(self) -> BucketBatch {
        self.batch
    }
}

impl Default for BatchBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_json_builder() {
        let json = BucketJsonBuilder::new()
            .now(2000)
            .bucket_seconds(60)
            .reading(1000, Some(5.0), None)
            .build();
        assert_eq!(
            json,
            r#"{"now_epoch":2000,"bucket_seconds":60,"buckets":[[1000,5,null,12,null,null,null,null,null,null]]}"#
        );
    }
}
