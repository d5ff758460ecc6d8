//! Tabular result export

use anyhow::Result;
use isoreach_core::models::{FacilityResult, TimeThreshold};
use std::path::Path;

/// Write one CSV row per successful facility, in batch output order
///
/// Columns are the source headers, then the validated `name`/`lat`/`lon`,
/// then one `population_{minutes}min` column per configured threshold. A
/// failed aggregation renders as the legacy -1 sentinel; a threshold absent
/// from the result renders as an empty cell.
pub fn write_results_csv(
    path: &Path,
    results: &[FacilityResult],
    source_headers: &[String],
    thresholds: &[TimeThreshold],
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header: Vec<String> = source_headers.to_vec();
    header.push("name".to_string());
    header.push("lat".to_string());
    header.push("lon".to_string());
    for threshold in thresholds {
        header.push(format!("population_{}min", threshold.minutes()));
    }
    writer.write_record(&header)?;

    for result in results {
        let mut record: Vec<String> = source_headers
            .iter()
            .map(|h| result.facility.attributes.get(h).cloned().unwrap_or_default())
            .collect();
        record.push(result.facility.name.clone());
        record.push(result.facility.lat.to_string());
        record.push(result.facility.lon.to_string());
        for threshold in thresholds {
            let cell = result
                .thresholds
                .get(threshold)
                .map(|t| t.population.sentinel().to_string())
                .unwrap_or_default();
            record.push(cell);
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::MultiPolygon;
    use isoreach_core::models::{Facility, PopulationEstimate, ThresholdResult};
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn polygon() -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
            vec![34.0, 0.0],
            vec![35.0, 0.0],
            vec![35.0, 1.0],
            vec![34.0, 0.0],
        ]]))
    }

    fn result() -> FacilityResult {
        let mut attributes = BTreeMap::new();
        attributes.insert("Facility Name".to_string(), "Alpha Health Centre".to_string());
        attributes.insert("Keph Level".to_string(), "Level 4".to_string());

        let mut thresholds = BTreeMap::new();
        thresholds.insert(
            TimeThreshold(900),
            ThresholdResult {
                polygon: polygon(),
                population: PopulationEstimate::Measured(1000.0),
            },
        );
        thresholds.insert(
            TimeThreshold(2700),
            ThresholdResult { polygon: polygon(), population: PopulationEstimate::Failed },
        );

        FacilityResult {
            facility: Facility {
                name: "Alpha Health Centre".to_string(),
                lat: 0.5,
                lon: 35.0,
                attributes,
            },
            thresholds,
            combined: MultiPolygon(vec![]),
        }
    }

    #[test]
    fn test_export_columns_and_sentinels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let headers = vec!["Facility Name".to_string(), "Keph Level".to_string()];
        let thresholds = vec![TimeThreshold(900), TimeThreshold(1800), TimeThreshold(2700)];

        write_results_csv(&path, &[result()], &headers, &thresholds).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Facility Name,Keph Level,name,lat,lon,population_15min,population_30min,population_45min"
        );
        // 15 min measured, 30 min absent (isochrone failed), 45 min failed
        // aggregation rendered as the -1 sentinel.
        assert_eq!(
            lines.next().unwrap(),
            "Alpha Health Centre,Level 4,Alpha Health Centre,0.5,35,1000,,-1"
        );
    }

    #[test]
    fn test_export_no_results_still_writes_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let headers = vec!["Name".to_string()];

        write_results_csv(&path, &[], &headers, &[TimeThreshold(900)]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), "Name,name,lat,lon,population_15min");
    }
}
