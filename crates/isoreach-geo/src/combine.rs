//! Combine per-threshold isochrone geometries for rendering

use geo::{Geometry as GeoGeometry, MultiPolygon};

/// Collect every polygon from a set of GeoJSON geometries into one
/// `MultiPolygon`
///
/// The routing backend returns a Polygon or MultiPolygon per threshold;
/// the map layer wants a single geometry per facility. Non-areal geometries
/// are skipped with a warning rather than failing the facility.
pub fn combine_polygons(geometries: &[&geojson::Geometry]) -> MultiPolygon<f64> {
    let mut polygons = Vec::new();

    for geometry in geometries {
        match GeoGeometry::<f64>::try_from(geometry.value.clone()) {
            Ok(GeoGeometry::Polygon(polygon)) => polygons.push(polygon),
            Ok(GeoGeometry::MultiPolygon(multi)) => polygons.extend(multi.0),
            Ok(other) => {
                tracing::warn!("Skipping non-areal isochrone geometry: {:?}", kind_of(&other));
            }
            Err(e) => {
                tracing::warn!("Skipping unconvertible isochrone geometry: {}", e);
            }
        }
    }

    MultiPolygon(polygons)
}

fn kind_of(geometry: &GeoGeometry<f64>) -> &'static str {
    match geometry {
        GeoGeometry::Point(_) => "Point",
        GeoGeometry::Line(_) => "Line",
        GeoGeometry::LineString(_) => "LineString",
        GeoGeometry::Polygon(_) => "Polygon",
        GeoGeometry::MultiPoint(_) => "MultiPoint",
        GeoGeometry::MultiLineString(_) => "MultiLineString",
        GeoGeometry::MultiPolygon(_) => "MultiPolygon",
        GeoGeometry::GeometryCollection(_) => "GeometryCollection",
        GeoGeometry::Rect(_) => "Rect",
        GeoGeometry::Triangle(_) => "Triangle",
    }
}
