//! OpenRouteService-compatible routing client

use crate::http::{classify_send_error, classify_status};
use crate::ports::{BackendError, BackendResult, HealthStatus, IsochroneOutcome, RoutingBackend};
use async_trait::async_trait;
use isoreach_core::config::LayeredConfig;
use isoreach_core::models::TimeThreshold;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct OrsClient {
    /// Base URL including the service prefix (e.g. "http://host:8080/ors")
    base_url: String,

    /// API key sent as the Authorization header; empty for self-hosted
    /// instances that do not check one
    api_key: String,

    /// Routing profile (e.g. "driving-car")
    profile: String,

    /// Per-request timeout
    timeout: Duration,

    /// HTTP client
    client: reqwest::Client,
}

impl OrsClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        profile: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            profile: profile.into(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &LayeredConfig) -> Self {
        Self::new(
            config.ors_base_url.value.clone(),
            config.ors_api_key.value.clone(),
            config.ors_profile.value.clone(),
            Duration::from_secs(config.ors_timeout_secs.value),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, url).timeout(self.timeout);
        if !self.api_key.is_empty() {
            builder = builder.header("Authorization", &self.api_key);
        }
        builder
    }
}

#[async_trait]
impl RoutingBackend for OrsClient {
    async fn isochrone(
        &self,
        lat: f64,
        lon: f64,
        range: TimeThreshold,
    ) -> BackendResult<IsochroneOutcome> {
        let url = format!("{}/v2/isochrones/{}", self.base_url, self.profile);
        let request = IsochroneRequest {
            // ORS expects [lon, lat]
            locations: vec![[lon, lat]],
            range: vec![range.seconds()],
            range_type: "time",
            attributes: vec!["total_pop"],
        };

        let response = self
            .request(reqwest::Method::POST, url)
            .json(&request)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let collection: geojson::FeatureCollection = response
            .json()
            .await
            .map_err(|e| BackendError::Transient(format!("malformed isochrone response: {}", e)))?;

        Ok(extract_polygon(collection))
    }

    async fn health(&self) -> BackendResult<HealthStatus> {
        let url = format!("{}/v2/health", self.base_url);
        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| BackendError::Fatal(format!("cannot reach routing backend: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Ok(HealthStatus::Degraded(format!("health endpoint returned {}", status)));
        }

        match response.json::<HealthResponse>().await {
            Ok(health) if health.status == "ready" => Ok(HealthStatus::Ready),
            Ok(health) => Ok(HealthStatus::Degraded(health.status)),
            // A 200 with an unexpected body still counts as answering.
            Err(_) => Ok(HealthStatus::Ready),
        }
    }
}

/// Success only if the response carries at least one feature with a
/// non-empty geometry; anything else is the soft `Empty` outcome.
fn extract_polygon(collection: geojson::FeatureCollection) -> IsochroneOutcome {
    let Some(feature) = collection.features.into_iter().next() else {
        return IsochroneOutcome::Empty;
    };
    let Some(geometry) = feature.geometry else {
        return IsochroneOutcome::Empty;
    };

    let empty = match &geometry.value {
        geojson::Value::Polygon(rings) => rings.is_empty(),
        geojson::Value::MultiPolygon(polygons) => polygons.is_empty(),
        _ => false,
    };
    if empty {
        IsochroneOutcome::Empty
    } else {
        IsochroneOutcome::Polygon(geometry)
    }
}

/// Request body for the isochrones endpoint
#[derive(Debug, Serialize)]
struct IsochroneRequest {
    locations: Vec<[f64; 2]>,
    range: Vec<u32>,
    range_type: &'static str,
    attributes: Vec<&'static str>,
}

/// Response from the health endpoint
#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}
