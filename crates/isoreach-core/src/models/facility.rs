use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A point-located entity under analysis (e.g. a clinic)
///
/// Coordinates are validated WGS84 degrees. The source row travels along
/// verbatim so exports can reproduce the input columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    /// Facility name
    pub name: String,

    /// Latitude (WGS84)
    pub lat: f64,

    /// Longitude (WGS84)
    pub lon: f64,

    /// Source row attributes, keyed by normalized header
    pub attributes: BTreeMap<String, String>,
}
