//! Population raster reduction client
//!
//! Talks to a raster service exposing a tile catalog and a region-reduction
//! endpoint over a population dataset (e.g. a WorldPop mirror).

use crate::http::{classify_send_error, classify_status};
use crate::ports::{BackendError, BackendResult, DateWindow, RasterBackend, ReduceQuery, Snapshot};
use async_trait::async_trait;
use chrono::NaiveDate;
use isoreach_core::config::LayeredConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct RasterServiceClient {
    base_url: String,

    /// Per-request timeout
    timeout: Duration,

    /// HTTP client
    client: reqwest::Client,
}

impl RasterServiceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self { base_url: base_url.into(), timeout, client: reqwest::Client::new() }
    }

    pub fn from_config(config: &LayeredConfig) -> Self {
        Self::new(
            config.raster_base_url.value.clone(),
            Duration::from_secs(config.ors_timeout_secs.value),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RasterBackend for RasterServiceClient {
    async fn tile_count(&self, dataset: &str, window: &DateWindow) -> BackendResult<u64> {
        let url = format!("{}/v1/tiles", self.base_url);
        let start = window.start.to_string();
        let end = window.end.to_string();
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .query(&[("dataset", dataset), ("start", start.as_str()), ("end", end.as_str())])
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let tiles: TileCountResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Transient(format!("malformed tile response: {}", e)))?;
        Ok(tiles.count)
    }

    async fn reduce_sum(&self, query: &ReduceQuery<'_>) -> BackendResult<Option<f64>> {
        let url = format!("{}/v1/reduce", self.base_url);
        let request = ReduceRequest {
            dataset: query.dataset,
            snapshot: SnapshotWire::from(query.snapshot),
            geometry: query.geometry,
            reducer: "sum",
            band: "population",
            scale: query.scale_m,
            max_pixels: query.max_pixels,
        };

        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let reduction: ReduceResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Transient(format!("malformed reduce response: {}", e)))?;
        Ok(reduction.value)
    }
}

/// Request body for the reduce endpoint
#[derive(Debug, Serialize)]
struct ReduceRequest<'a> {
    dataset: &'a str,
    snapshot: SnapshotWire,
    geometry: &'a geojson::Geometry,
    reducer: &'static str,
    band: &'static str,
    scale: u32,
    max_pixels: u64,
}

/// Wire form of the snapshot selector
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SnapshotWire {
    Window { start: NaiveDate, end: NaiveDate },
    Latest,
}

impl From<Snapshot> for SnapshotWire {
    fn from(snapshot: Snapshot) -> Self {
        match snapshot {
            Snapshot::Window(window) => {
                SnapshotWire::Window { start: window.start, end: window.end }
            }
            Snapshot::Latest => SnapshotWire::Latest,
        }
    }
}

/// Response from the tile catalog endpoint
#[derive(Debug, Deserialize)]
struct TileCountResponse {
    count: u64,
}

/// Response from the reduce endpoint; `value` is absent or null when the
/// band produced nothing over the region
#[derive(Debug, Deserialize)]
struct ReduceResponse {
    #[serde(default)]
    value: Option<f64>,
}
