//! Coordinate coercion, range validation, and the regional swap rule

use isoreach_core::error::{IsoreachError, Result};

/// Coerce a raw cell value into a coordinate
///
/// Accepts anything `f64`-parsable after trimming. An absent or blank cell
/// is a missing coordinate, which callers treat differently from a value
/// that is present but malformed.
pub fn coerce_coordinate(field: &'static str, raw: Option<&str>) -> Result<f64> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let raw = raw.ok_or(IsoreachError::MissingCoordinate { field })?;

    raw.parse::<f64>().map_err(|_| IsoreachError::NonNumericCoordinate {
        field,
        value: raw.to_string(),
    })
}

/// Range-check a coordinate pair, returning it unchanged when valid
pub fn validate_range(lat: f64, lon: f64) -> Result<(f64, f64)> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(IsoreachError::LatitudeOutOfRange { value: lat });
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(IsoreachError::LongitudeOutOfRange { value: lon });
    }
    Ok((lat, lon))
}

/// Transposition rule for likely-swapped coordinate pairs
///
/// Deployments centered on a known region can read a latitude far above the
/// region's band, or a longitude far below it, as an upstream lat/lon column
/// mix-up rather than a genuine out-of-region facility. The bounds come from
/// configuration; this is a regional heuristic, not a universal rule, and
/// callers apply it before strict range validation.
#[derive(Debug, Clone, Copy)]
pub struct SwapRule {
    /// Latitudes above this are read as longitudes
    pub lat_above: f64,
    /// Longitudes below this are read as latitudes
    pub lon_below: f64,
}

impl SwapRule {
    pub fn new(lat_above: f64, lon_below: f64) -> Self {
        Self { lat_above, lon_below }
    }

    /// Whether the pair matches the transposition pattern
    pub fn looks_swapped(&self, lat: f64, lon: f64) -> bool {
        lat > self.lat_above || lon < self.lon_below
    }

    /// Swap the pair when it matches the pattern, otherwise pass it through
    pub fn apply(&self, lat: f64, lon: f64) -> (f64, f64) {
        if self.looks_swapped(lat, lon) {
            (lon, lat)
        } else {
            (lat, lon)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Default rule for the Kenya deployment
    fn kenya_rule() -> SwapRule {
        SwapRule::new(10.0, -5.0)
    }

    #[test]
    fn test_coerce_plain_number() {
        assert_eq!(coerce_coordinate("lat", Some("0.2745556")).unwrap(), 0.2745556);
        assert_eq!(coerce_coordinate("lon", Some("-1.5")).unwrap(), -1.5);
    }

    #[test]
    fn test_coerce_trims_whitespace() {
        assert_eq!(coerce_coordinate("lat", Some("  34.7582332  ")).unwrap(), 34.7582332);
    }

    #[test]
    fn test_coerce_missing() {
        assert!(matches!(
            coerce_coordinate("lat", None),
            Err(IsoreachError::MissingCoordinate { field: "lat" })
        ));
        assert!(matches!(
            coerce_coordinate("lon", Some("   ")),
            Err(IsoreachError::MissingCoordinate { field: "lon" })
        ));
    }

    #[test]
    fn test_coerce_non_numeric() {
        assert!(matches!(
            coerce_coordinate("lat", Some("north")),
            Err(IsoreachError::NonNumericCoordinate { .. })
        ));
    }

    #[test]
    fn test_range_bounds() {
        assert!(validate_range(90.0, 180.0).is_ok());
        assert!(validate_range(-90.0, -180.0).is_ok());
        assert!(matches!(
            validate_range(90.001, 0.0),
            Err(IsoreachError::LatitudeOutOfRange { .. })
        ));
        assert!(matches!(
            validate_range(-91.0, 0.0),
            Err(IsoreachError::LatitudeOutOfRange { .. })
        ));
        assert!(matches!(
            validate_range(0.0, 180.5),
            Err(IsoreachError::LongitudeOutOfRange { .. })
        ));
        assert!(matches!(
            validate_range(0.0, -181.0),
            Err(IsoreachError::LongitudeOutOfRange { .. })
        ));
    }

    #[test]
    fn test_swap_rule_corrects_transposed_pair() {
        // lat=40 is far above the Kenyan latitude band; read as (lon, lat).
        let (lat, lon) = kenya_rule().apply(40.0, 1.0);
        assert_eq!((lat, lon), (1.0, 40.0));
        // The corrected pair lands inside the expected regional bands.
        assert!((-5.0..=6.0).contains(&lat));
        assert!((34.0..=42.0).contains(&lon));
    }

    #[test]
    fn test_swap_rule_triggers_on_low_longitude() {
        let (lat, lon) = kenya_rule().apply(36.5, -10.0);
        assert_eq!((lat, lon), (-10.0, 36.5));
    }

    #[test]
    fn test_swap_rule_leaves_in_region_pairs_alone() {
        let (lat, lon) = kenya_rule().apply(0.050608, 37.6508131);
        assert_eq!((lat, lon), (0.050608, 37.6508131));
    }

    proptest! {
        #[test]
        fn valid_pairs_pass_through_unchanged(
            lat in -90.0f64..=90.0,
            lon in -180.0f64..=180.0,
        ) {
            let (out_lat, out_lon) = validate_range(lat, lon).unwrap();
            prop_assert_eq!(out_lat, lat);
            prop_assert_eq!(out_lon, lon);
        }

        #[test]
        fn out_of_range_latitude_rejected(
            lat in prop_oneof![90.0001f64..1.0e9, -1.0e9f64..-90.0001],
            lon in -180.0f64..=180.0,
        ) {
            prop_assert!(
                matches!(
                    validate_range(lat, lon),
                    Err(IsoreachError::LatitudeOutOfRange { .. })
                ),
                "expected LatitudeOutOfRange"
            );
        }

        #[test]
        fn out_of_range_longitude_rejected(
            lat in -90.0f64..=90.0,
            lon in prop_oneof![180.0001f64..1.0e9, -1.0e9f64..-180.0001],
        ) {
            prop_assert!(
                matches!(
                    validate_range(lat, lon),
                    Err(IsoreachError::LongitudeOutOfRange { .. })
                ),
                "expected LongitudeOutOfRange"
            );
        }

        #[test]
        fn coercion_round_trips_formatted_floats(value in -500.0f64..500.0) {
            let formatted = format!("{}", value);
            prop_assert_eq!(coerce_coordinate("lat", Some(&formatted)).unwrap(), value);
        }
    }
}
