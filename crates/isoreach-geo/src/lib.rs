//! Coordinate validation and geometry helpers for isoreach

pub mod combine;
pub mod coords;

pub use combine::combine_polygons;
pub use coords::{coerce_coordinate, validate_range, SwapRule};
