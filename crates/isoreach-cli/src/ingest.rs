//! Facility table ingestion
//!
//! Loads the facility CSV, normalizes headers, resolves the coordinate,
//! name, and level columns by case-insensitive substring match, and
//! pre-filters rows by administrative facility level.

use anyhow::Result;
use isoreach_core::error::IsoreachError;
use isoreach_pipeline::{ColumnMap, FacilityRow};
use std::collections::BTreeMap;
use std::path::Path;

/// A loaded facility table with its resolved columns
#[derive(Debug, Clone)]
pub struct FacilityTable {
    /// Normalized headers, in file order
    pub headers: Vec<String>,

    /// All data rows, in file order
    pub rows: Vec<FacilityRow>,

    /// Resolved coordinate and name columns
    pub columns: ColumnMap,

    /// Resolved facility-level column, when one exists
    pub level_column: Option<String>,
}

/// Find a header matching any of the given patterns (case-insensitive
/// substring), in pattern priority order
pub fn find_column(headers: &[String], patterns: &[&str]) -> Option<String> {
    for pattern in patterns {
        let needle = pattern.to_lowercase();
        if let Some(header) = headers.iter().find(|h| h.to_lowercase().contains(&needle)) {
            return Some(header.clone());
        }
    }
    None
}

/// Load the facility table from a CSV file
pub fn load_facilities(path: &Path) -> Result<FacilityTable> {
    if !path.exists() {
        return Err(IsoreachError::InputNotFound { path: path.to_path_buf() }.into());
    }

    tracing::info!("Loading data from {}...", path.display());

    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> =
        reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    tracing::debug!("Columns found: {:?}", headers);

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let cells: BTreeMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.clone(), cell.to_string()))
            .collect();
        rows.push(FacilityRow { index, cells });
    }

    // The fuzzy fallbacks mirror common facility-register spellings; a
    // wrong fallback surfaces per-row as a missing coordinate.
    let columns = ColumnMap {
        lat: find_column(&headers, &["lat"]).unwrap_or_else(|| "Latitude".to_string()),
        lon: find_column(&headers, &["lon"]).unwrap_or_else(|| "Longitude".to_string()),
        name: find_column(&headers, &["name"]),
    };
    let level_column = find_column(&headers, &["level"]);

    Ok(FacilityTable { headers, rows, columns, level_column })
}

/// Keep rows whose level cell contains any of the target level strings
pub fn filter_by_level(table: &FacilityTable, target_levels: &[String]) -> Result<Vec<FacilityRow>> {
    let level_column = table.level_column.as_deref().ok_or_else(|| {
        IsoreachError::ColumnNotFound { name: "level".to_string() }
    })?;
    tracing::info!("Using column '{}' for filtering.", level_column);

    let filtered: Vec<FacilityRow> = table
        .rows
        .iter()
        .filter(|row| {
            row.get(level_column)
                .map(|value| target_levels.iter().any(|level| value.contains(level.as_str())))
                .unwrap_or(false)
        })
        .cloned()
        .collect();

    tracing::info!("Filtered down to {} facilities from {}.", filtered.len(), table.rows.len());
    if filtered.is_empty() {
        tracing::warn!("No facilities match the target levels after filtering.");
    }

    Ok(filtered)
}
