//! Per-facility orchestration

use crate::isochrone::request_isochrone;
use crate::population::aggregate_population;
use crate::settings::PipelineSettings;
use isoreach_backends::{RasterBackend, RoutingBackend};
use isoreach_core::models::{Facility, FacilityResult, PopulationEstimate, ThresholdResult};
use isoreach_geo::{coerce_coordinate, combine_polygons, validate_range};
use std::collections::BTreeMap;

/// One tabular facility row, as ingested
#[derive(Debug, Clone)]
pub struct FacilityRow {
    /// 0-based position in the input file
    pub index: usize,

    /// Cell values keyed by normalized header
    pub cells: BTreeMap<String, String>,
}

impl FacilityRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }
}

/// Column names resolved by ingestion's fuzzy detection
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub lat: String,
    pub lon: String,
    pub name: Option<String>,
}

/// Process a single facility: one isochrone request per configured
/// threshold, one population aggregation per polygon
///
/// Partial failure across thresholds is not fatal: a threshold whose
/// isochrone failed is absent from the result, and a threshold whose
/// aggregation failed records `PopulationEstimate::Failed`. Returns nothing
/// when the coordinates are unusable or every threshold failed.
pub async fn process_facility(
    row: &FacilityRow,
    columns: &ColumnMap,
    routing: &dyn RoutingBackend,
    raster: &dyn RasterBackend,
    settings: &PipelineSettings,
) -> Option<FacilityResult> {
    let lat = match coerce_coordinate("latitude", row.get(&columns.lat)) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Row {}: {}", row.index + 1, e);
            return None;
        }
    };
    let lon = match coerce_coordinate("longitude", row.get(&columns.lon)) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Row {}: {}", row.index + 1, e);
            return None;
        }
    };

    let name = columns
        .name
        .as_deref()
        .and_then(|c| row.get(c))
        .map(str::to_string)
        .unwrap_or_else(|| format!("Facility at ({}, {})", lat, lon));

    // Transposition correction runs before strict validation: a swapped
    // pair is often range-valid but far outside the operating region.
    let (lat, lon) = match settings.swap {
        Some(rule) => {
            let corrected = rule.apply(lat, lon);
            if corrected != (lat, lon) {
                tracing::warn!(
                    "Coordinates for {} look transposed ({}, {}); swapping",
                    name,
                    lat,
                    lon
                );
            }
            corrected
        }
        None => (lat, lon),
    };

    let (lat, lon) = match validate_range(lat, lon) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!("Invalid coordinates for {}: {}", name, e);
            return None;
        }
    };

    tracing::info!("Processing {} ({}, {})...", name, lat, lon);

    let mut thresholds = BTreeMap::new();
    for (i, &range) in settings.thresholds.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(settings.sleep_between).await;
        }

        let Some(polygon) = request_isochrone(routing, lat, lon, range, &settings.retry).await
        else {
            tracing::warn!("No isochrone for {} at {}; skipping threshold", name, range);
            continue;
        };

        let population =
            PopulationEstimate::from(aggregate_population(raster, &polygon, &settings.raster).await);
        match population {
            PopulationEstimate::Measured(value) => {
                tracing::info!("  {}: population {:.0}", range, value);
            }
            PopulationEstimate::Failed => {
                tracing::warn!("Failed to calculate population for {} at {}", name, range);
            }
        }

        thresholds.insert(range, ThresholdResult { polygon, population });
    }

    if thresholds.is_empty() {
        tracing::warn!("All thresholds failed for {}; no result emitted", name);
        return None;
    }

    let polygons: Vec<&geojson::Geometry> = thresholds.values().map(|t| &t.polygon).collect();
    let combined = combine_polygons(&polygons);

    Some(FacilityResult {
        facility: Facility { name, lat, lon, attributes: row.cells.clone() },
        thresholds,
        combined,
    })
}
