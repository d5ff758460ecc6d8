//! Population aggregation over isochrone polygons

use isoreach_backends::{DateWindow, RasterBackend, ReduceQuery, Snapshot};
use isoreach_core::config::LayeredConfig;

/// Floor on the reduction resolution in meters
///
/// Finer requested scales are clamped up to this so the reduction stays
/// inside the backend's pixel budget even for the widest isochrones.
pub const MIN_RELIABLE_SCALE_M: u32 = 250;

/// Raster-query parameters for one run
#[derive(Debug, Clone)]
pub struct RasterParams {
    pub dataset: String,

    /// Requested resolution in meters (clamped to [`MIN_RELIABLE_SCALE_M`])
    pub scale_m: u32,

    pub max_pixels: u64,

    /// Preferred tile window; the aggregator falls back to the most recent
    /// snapshot when no tiles are dated inside it
    pub reference_window: DateWindow,
}

impl RasterParams {
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self {
            dataset: config.raster_dataset.value.clone(),
            scale_m: config.raster_scale_m.value,
            max_pixels: config.raster_max_pixels.value,
            reference_window: DateWindow {
                start: config.reference_window_start.value,
                end: config.reference_window_end.value,
            },
        }
    }
}

/// Sum the population band over one polygon
///
/// Prefers a mosaic of tiles dated inside the reference window, falling
/// back to the most recent snapshot when the window is empty. Returns
/// `None` when the backend yields no value for the band (distinct from a
/// measured zero) and converts every backend error to `None` as well;
/// nothing here ever propagates to the caller.
pub async fn aggregate_population(
    raster: &dyn RasterBackend,
    geometry: &geojson::Geometry,
    params: &RasterParams,
) -> Option<f64> {
    let snapshot = match raster.tile_count(&params.dataset, &params.reference_window).await {
        Ok(count) if count > 0 => Snapshot::Window(params.reference_window),
        Ok(_) => {
            tracing::debug!(
                "No {} tiles dated {}..{}; using the latest snapshot",
                params.dataset,
                params.reference_window.start,
                params.reference_window.end
            );
            Snapshot::Latest
        }
        Err(e) => {
            tracing::error!("Raster tile lookup failed: {}", e);
            return None;
        }
    };

    let query = ReduceQuery {
        dataset: &params.dataset,
        snapshot,
        geometry,
        scale_m: params.scale_m.max(MIN_RELIABLE_SCALE_M),
        max_pixels: params.max_pixels,
    };

    match raster.reduce_sum(&query).await {
        Ok(Some(population)) => {
            tracing::debug!("Population calculated: {:.0}", population);
            Some(population)
        }
        Ok(None) => {
            tracing::warn!("Raster backend returned no value for the population band");
            None
        }
        Err(e) => {
            tracing::error!("Population aggregation error: {}", e);
            None
        }
    }
}
