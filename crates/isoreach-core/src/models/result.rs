use super::facility::Facility;
use super::population::PopulationEstimate;
use super::threshold::TimeThreshold;
use geo::MultiPolygon;
use std::collections::BTreeMap;

/// The outcome for one (facility, threshold) pair
#[derive(Debug, Clone)]
pub struct ThresholdResult {
    /// Isochrone geometry returned by the routing backend (Polygon or
    /// MultiPolygon), immutable after creation
    pub polygon: geojson::Geometry,

    /// Population summed inside the polygon
    pub population: PopulationEstimate,
}

/// Composite per-facility result
///
/// Created once, after every configured threshold has been attempted.
/// Thresholds whose isochrone request failed are simply absent from the
/// map; a facility with an empty map is never constructed (the processor
/// returns nothing instead).
#[derive(Debug, Clone)]
pub struct FacilityResult {
    pub facility: Facility,

    /// Per-threshold outcomes, ordered by threshold
    pub thresholds: BTreeMap<TimeThreshold, ThresholdResult>,

    /// Union of all threshold polygons, derived for rendering
    pub combined: MultiPolygon<f64>,
}

impl FacilityResult {
    /// The largest threshold present in this result
    pub fn largest_threshold(&self) -> Option<TimeThreshold> {
        self.thresholds.keys().next_back().copied()
    }

    /// The population figure used for summary reporting
    ///
    /// By convention this is the estimate at the largest threshold present,
    /// so a facility whose widest isochrone failed still reports something.
    pub fn primary_population(&self) -> Option<PopulationEstimate> {
        self.largest_threshold().map(|t| self.thresholds[&t].population)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::{Geometry, Value};

    fn square_polygon() -> Geometry {
        Geometry::new(Value::Polygon(vec![vec![
            vec![34.0, 0.0],
            vec![35.0, 0.0],
            vec![35.0, 1.0],
            vec![34.0, 1.0],
            vec![34.0, 0.0],
        ]]))
    }

    fn facility() -> Facility {
        Facility {
            name: "Test Facility".to_string(),
            lat: 0.5,
            lon: 34.5,
            attributes: Default::default(),
        }
    }

    #[test]
    fn test_primary_population_uses_largest_threshold() {
        let mut thresholds = BTreeMap::new();
        thresholds.insert(
            TimeThreshold(900),
            ThresholdResult {
                polygon: square_polygon(),
                population: PopulationEstimate::Measured(1000.0),
            },
        );
        thresholds.insert(
            TimeThreshold(2700),
            ThresholdResult {
                polygon: square_polygon(),
                population: PopulationEstimate::Measured(5000.0),
            },
        );

        let result = FacilityResult {
            facility: facility(),
            thresholds,
            combined: MultiPolygon(vec![]),
        };

        assert_eq!(result.largest_threshold(), Some(TimeThreshold(2700)));
        assert_eq!(result.primary_population(), Some(PopulationEstimate::Measured(5000.0)));
    }

    #[test]
    fn test_primary_population_with_partial_thresholds() {
        // Only the middle threshold succeeded; primary falls to it.
        let mut thresholds = BTreeMap::new();
        thresholds.insert(
            TimeThreshold(1800),
            ThresholdResult {
                polygon: square_polygon(),
                population: PopulationEstimate::Failed,
            },
        );

        let result = FacilityResult {
            facility: facility(),
            thresholds,
            combined: MultiPolygon(vec![]),
        };

        assert_eq!(result.largest_threshold(), Some(TimeThreshold(1800)));
        assert_eq!(result.primary_population(), Some(PopulationEstimate::Failed));
    }
}
