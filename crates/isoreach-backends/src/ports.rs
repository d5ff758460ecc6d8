//! Backend port definitions
//!
//! Test doubles implement these traits directly; the pipeline never sees a
//! concrete client type.

use async_trait::async_trait;
use chrono::NaiveDate;
use isoreach_core::models::TimeThreshold;
use thiserror::Error;

/// Error from a backend call, tagged by how callers should react
#[derive(Debug, Error)]
pub enum BackendError {
    /// Worth retrying: network failure, timeout, throttling, server error
    #[error("transient backend error: {0}")]
    Transient(String),

    /// Not worth retrying: rejected request, auth failure, unreachable host
    #[error("fatal backend error: {0}")]
    Fatal(String),
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Outcome of one isochrone request
///
/// `Empty` is a successful call that carried no usable features. It is a
/// soft failure: callers do not retry it, and they do not treat it as a
/// polygon either.
#[derive(Debug, Clone)]
pub enum IsochroneOutcome {
    Polygon(geojson::Geometry),
    Empty,
}

/// Routing backend health, as reported by its status endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Ready,
    Degraded(String),
}

/// Port for the road-network routing backend
#[async_trait]
pub trait RoutingBackend: Send + Sync {
    /// Request the drive-time polygon for one location at one threshold
    ///
    /// The backend accepts a single range per request; callers needing N
    /// thresholds issue N independent calls.
    async fn isochrone(
        &self,
        lat: f64,
        lon: f64,
        range: TimeThreshold,
    ) -> BackendResult<IsochroneOutcome>;

    /// Probe the status endpoint
    ///
    /// `Err(Fatal)` means the host is unreachable; `Degraded` means it
    /// answered but is not ready.
    async fn health(&self) -> BackendResult<HealthStatus>;
}

/// A date window selecting raster tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Which raster snapshot a reduction runs against
#[derive(Debug, Clone, Copy)]
pub enum Snapshot {
    /// Mosaic of all tiles dated inside the window
    Window(DateWindow),
    /// Most recently dated tile available
    Latest,
}

/// One sum-reduction request over a region
#[derive(Debug, Clone)]
pub struct ReduceQuery<'a> {
    pub dataset: &'a str,
    pub snapshot: Snapshot,
    pub geometry: &'a geojson::Geometry,
    /// Spatial resolution in meters
    pub scale_m: u32,
    /// Pixel budget the backend enforces per reduction
    pub max_pixels: u64,
}

/// Port for the population raster backend
#[async_trait]
pub trait RasterBackend: Send + Sync {
    /// Number of raster tiles dated inside the window
    async fn tile_count(&self, dataset: &str, window: &DateWindow) -> BackendResult<u64>;

    /// Sum the population band over the region
    ///
    /// `Ok(None)` means the backend yielded no value for the band, which is
    /// distinct from a measured zero.
    async fn reduce_sum(&self, query: &ReduceQuery<'_>) -> BackendResult<Option<f64>>;
}
