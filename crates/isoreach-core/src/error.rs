//! Error types for isoreach

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IsoreachError {
    // Coordinate errors
    #[error("Missing coordinate: {field}")]
    MissingCoordinate { field: &'static str },

    #[error("Coordinate {field} is not numeric: '{value}'")]
    NonNumericCoordinate { field: &'static str, value: String },

    #[error("Latitude out of range: {value} (must be -90 to 90)")]
    LatitudeOutOfRange { value: f64 },

    #[error("Longitude out of range: {value} (must be -180 to 180)")]
    LongitudeOutOfRange { value: f64 },

    // Input errors
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Required column not found: {name}. Check the facility file headers")]
    ColumnNotFound { name: String },

    // Backend errors
    #[error("Routing backend unreachable: {reason}. Try: {remediation}")]
    RoutingUnavailable { reason: String, remediation: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, IsoreachError>;
