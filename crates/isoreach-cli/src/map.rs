//! Interactive map artifact
//!
//! Renders a self-contained Leaflet HTML page: one colored overlay per
//! (facility, threshold), a dashed coverage outline per facility, and a
//! marker with a population popup. Presentation only; everything
//! interesting happened upstream.

use anyhow::Result;
use isoreach_core::config::LayeredConfig;
use isoreach_core::models::{FacilityResult, PopulationEstimate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// One rendered map layer
#[derive(Debug, Clone, Serialize)]
pub struct MapOverlay {
    pub label: String,
    pub color: String,
    /// Threshold minutes for the legend; absent for outline layers
    pub minutes: Option<u32>,
    /// Drawn as a dashed, unfilled boundary when set
    pub outline: bool,
    pub geometry: geojson::Geometry,
}

/// One facility marker
#[derive(Debug, Clone, Serialize)]
pub struct MapMarker {
    pub lat: f64,
    pub lon: f64,
    pub popup: String,
    pub tooltip: String,
}

/// Map presentation settings resolved from configuration
#[derive(Debug, Clone)]
pub struct MapStyle {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u32,
    pub opacity: f64,
    pub colors: BTreeMap<u32, String>,
}

impl MapStyle {
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self {
            center_lat: config.map_center_lat.value,
            center_lon: config.map_center_lon.value,
            zoom: config.map_zoom.value,
            opacity: config.map_opacity.value,
            colors: config.map_colors.value.clone(),
        }
    }

    /// Fill color for a threshold, falling back to the Leaflet default blue
    pub fn color_for(&self, minutes: u32) -> String {
        self.colors.get(&minutes).cloned().unwrap_or_else(|| "#3388ff".to_string())
    }
}

/// Build overlays and markers from batch results
pub fn overlays_from_results(
    results: &[FacilityResult],
    style: &MapStyle,
) -> (Vec<MapOverlay>, Vec<MapMarker>) {
    let mut overlays = Vec::new();
    let mut markers = Vec::new();

    for result in results {
        let name = &result.facility.name;

        // Widest threshold first so narrower rings stay clickable on top.
        for (threshold, outcome) in result.thresholds.iter().rev() {
            let label = match outcome.population {
                PopulationEstimate::Measured(value) => {
                    format!("{}: {}, population {:.0}", name, threshold, value)
                }
                PopulationEstimate::Failed => {
                    format!("{}: {}, population unavailable", name, threshold)
                }
            };
            overlays.push(MapOverlay {
                label,
                color: style.color_for(threshold.minutes()),
                minutes: Some(threshold.minutes()),
                outline: false,
                geometry: outcome.polygon.clone(),
            });
        }

        if !result.combined.0.is_empty() {
            overlays.push(MapOverlay {
                label: format!("{} coverage", name),
                color: "#555555".to_string(),
                minutes: None,
                outline: true,
                geometry: geojson::Geometry::new(geojson::Value::from(&result.combined)),
            });
        }

        let popup = match result.primary_population() {
            Some(PopulationEstimate::Measured(value)) => {
                format!("<b>{}</b><br>Population: {:.0}", name, value)
            }
            _ => format!("<b>{}</b><br>Population: unavailable", name),
        };
        markers.push(MapMarker {
            lat: result.facility.lat,
            lon: result.facility.lon,
            popup,
            tooltip: name.clone(),
        });
    }

    (overlays, markers)
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8"/>
<title>__TITLE__</title>
<meta name="viewport" content="width=device-width, initial-scale=1.0"/>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"/>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>
  html, body, #map { height: 100%; margin: 0; }
  .legend { background: white; padding: 8px 12px; border: 2px solid grey; font: 14px sans-serif; }
  .legend .swatch { display: inline-block; width: 12px; height: 12px; margin-right: 6px; }
</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map('map').setView([__CENTER_LAT__, __CENTER_LON__], __ZOOM__);
L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', {
  attribution: '&copy; OpenStreetMap contributors'
}).addTo(map);

var overlays = __OVERLAYS__;
var markers = __MARKERS__;

overlays.forEach(function (overlay) {
  var style = overlay.outline
    ? { color: overlay.color, weight: 2, dashArray: '4', fill: false }
    : { color: overlay.color, fillColor: overlay.color, weight: 1, fillOpacity: __OPACITY__ };
  L.geoJSON(overlay.geometry, { style: style }).bindTooltip(overlay.label).addTo(map);
});

markers.forEach(function (marker) {
  L.marker([marker.lat, marker.lon]).bindPopup(marker.popup).bindTooltip(marker.tooltip).addTo(map);
});

var legend = L.control({ position: 'bottomright' });
legend.onAdd = function () {
  var div = L.DomUtil.create('div', 'legend');
  div.innerHTML = __LEGEND__;
  return div;
};
legend.addTo(map);
</script>
</body>
</html>
"#;

/// Render the full HTML page
pub fn render_map(
    title: &str,
    overlays: &[MapOverlay],
    markers: &[MapMarker],
    style: &MapStyle,
) -> Result<String> {
    let mut legend = String::from("<b>Driving time</b><br>");
    let mut seen: Vec<u32> = overlays.iter().filter_map(|o| o.minutes).collect();
    seen.sort_unstable();
    seen.dedup();
    for minutes in seen {
        legend.push_str(&format!(
            "<span class=\"swatch\" style=\"background: {}\"></span>{} min<br>",
            style.color_for(minutes),
            minutes
        ));
    }

    Ok(TEMPLATE
        .replace("__TITLE__", title)
        .replace("__CENTER_LAT__", &style.center_lat.to_string())
        .replace("__CENTER_LON__", &style.center_lon.to_string())
        .replace("__ZOOM__", &style.zoom.to_string())
        .replace("__OPACITY__", &style.opacity.to_string())
        .replace("__OVERLAYS__", &serde_json::to_string(overlays)?)
        .replace("__MARKERS__", &serde_json::to_string(markers)?)
        .replace("__LEGEND__", &serde_json::to_string(&legend)?))
}

/// Render and write the map artifact
pub fn write_map(
    path: &Path,
    title: &str,
    overlays: &[MapOverlay],
    markers: &[MapMarker],
    style: &MapStyle,
) -> Result<()> {
    let html = render_map(title, overlays, markers, style)?;
    std::fs::write(path, html)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::MultiPolygon;
    use isoreach_core::models::{Facility, ThresholdResult, TimeThreshold};
    use std::collections::BTreeMap as Map;

    fn style() -> MapStyle {
        let mut colors = Map::new();
        colors.insert(15, "#ff0000".to_string());
        colors.insert(45, "#ffaa00".to_string());
        MapStyle { center_lat: 0.0236, center_lon: 37.9062, zoom: 6, opacity: 0.3, colors }
    }

    fn polygon() -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
            vec![34.0, 0.0],
            vec![35.0, 0.0],
            vec![35.0, 1.0],
            vec![34.0, 1.0],
            vec![34.0, 0.0],
        ]]))
    }

    fn result() -> FacilityResult {
        let mut thresholds = Map::new();
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
                attributes: Default::default(),
            },
            thresholds,
            combined: MultiPolygon(vec![geo::Polygon::new(
                geo::LineString::from(vec![(34.0, 0.0), (35.0, 0.0), (35.0, 1.0), (34.0, 0.0)]),
                vec![],
            )]),
        }
    }

    #[test]
    fn test_overlays_widest_first_with_outline_and_marker() {
        let (overlays, markers) = overlays_from_results(&[result()], &style());

        // 45 min, 15 min, then the coverage outline.
        assert_eq!(overlays.len(), 3);
        assert_eq!(overlays[0].minutes, Some(45));
        assert!(overlays[0].label.contains("population unavailable"));
        assert_eq!(overlays[1].minutes, Some(15));
        assert!(overlays[1].label.contains("population 1000"));
        assert_eq!(overlays[1].color, "#ff0000");
        assert!(overlays[2].outline);
        assert_eq!(overlays[2].minutes, None);

        assert_eq!(markers.len(), 1);
        // Primary population is at the largest threshold, which failed here.
        assert!(markers[0].popup.contains("unavailable"));
        assert_eq!(markers[0].tooltip, "Alpha Health Centre");
    }

    #[test]
    fn test_color_fallback() {
        assert_eq!(style().color_for(30), "#3388ff");
        assert_eq!(style().color_for(15), "#ff0000");
    }

    #[test]
    fn test_render_map_embeds_data_and_legend() {
        let (overlays, markers) = overlays_from_results(&[result()], &style());
        let html = render_map("Facility coverage", &overlays, &markers, &style()).unwrap();

        assert!(html.contains("L.map('map')"));
        assert!(html.contains("setView([0.0236, 37.9062], 6)"));
        assert!(html.contains("Alpha Health Centre"));
        assert!(html.contains("#ff0000"));
        // Legend lists both threshold minutes.
        assert!(html.contains("15 min"));
        assert!(html.contains("45 min"));
        // No template tokens left behind.
        assert!(!html.contains("__OVERLAYS__"));
        assert!(!html.contains("__TITLE__"));
    }

    #[test]
    fn test_write_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.html");
        let (overlays, markers) = overlays_from_results(&[result()], &style());
        write_map(&path, "Coverage", &overlays, &markers, &style()).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("<!DOCTYPE html>"));
    }
}
