//! HTTP access to the station's JSON API
//!
//! [`DeviceApi`] is the transport seam: [`DeviceClient`] talks to the real
//! device with reqwest, tests substitute an in-memory fake. Deadlines and
//! decoding live in the free functions below so both share them.

use crate::backend::buckets::{clean_sparse_json, decode_buckets};
use crate::config::{DashboardConfig, DeviceChartConfig};
use crate::error::{Result, ResultExt, StationVisError};
use crate::types::BucketBatch;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;

/// Compact bucket history
pub const BUCKETS_PATH: &str = "/api/buckets_compact";

/// Plot layout served by the device
pub const CONFIG_PATH: &str = "/api/config";

/// Raw text access to device endpoints
pub trait DeviceApi: Send + Sync {
    /// GET `path` and return the body of a successful response
    fn fetch_text(&self, path: &str) -> impl Future<Output = Result<String>> + Send;
}

/// reqwest-backed client for a station at `base_url`
#[derive(Debug, Clone)]
pub struct DeviceClient {
    http_client: Client,
    base_url: String,
}

impl DeviceClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http_client = Client::builder()
            .build()
            .map_err(StationVisError::from)
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl DeviceApi for DeviceClient {
    async fn fetch_text(&self, path: &str) -> Result<String> {
        let url = self.url(path);
        tracing::trace!("GET {}", url);

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StationVisError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        tracing::trace!(len = body.len(), "Response from {}", url);
        Ok(body)
    }
}

/// Run `fut` with a deadline; expiry becomes [`StationVisError::Timeout`]
pub async fn with_timeout<T, F>(label: &str, limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(StationVisError::Timeout {
            url: label.to_string(),
            timeout_ms: limit.as_millis() as u64,
        }),
    }
}

/// Fetch and parse the device's plot layout
pub async fn fetch_chart_config<A: DeviceApi>(
    api: &A,
    limit: Duration,
) -> Result<DeviceChartConfig> {
    let text = with_timeout(CONFIG_PATH, limit, api.fetch_text(CONFIG_PATH)).await?;
    let config: DeviceChartConfig = serde_json::from_str(&clean_sparse_json(&text))
        .map_err(StationVisError::from)
        .context("Failed to decode device chart config")?;
    if config.plots.is_empty() {
        return Err(StationVisError::Config(
            "device chart config has no plots".to_string(),
        ));
    }
    Ok(config)
}

/// Fetch and decode one bucket batch.
///
/// `local_now` stands in for the device clock when the response omits it.
pub async fn fetch_buckets<A: DeviceApi>(
    api: &A,
    config: &DashboardConfig,
    local_now: i64,
) -> Result<BucketBatch> {
    let text = with_timeout(
        BUCKETS_PATH,
        config.timeouts.buckets_timeout(),
        api.fetch_text(BUCKETS_PATH),
    )
    .await?;
    decode_buckets(
        &text,
        &config.bucket_fields,
        config.recency_window_secs,
        local_now,
    )
}
