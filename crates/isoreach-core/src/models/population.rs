use serde::{Deserialize, Serialize};

/// Population aggregated over one isochrone polygon
///
/// `Failed` means the raster backend produced no value for the band. It is
/// distinct from `Measured(0.0)`, which is a legitimately empty area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PopulationEstimate {
    Measured(f64),
    Failed,
}

impl PopulationEstimate {
    /// The measured value, if any
    pub fn measured(&self) -> Option<f64> {
        match self {
            PopulationEstimate::Measured(v) => Some(*v),
            PopulationEstimate::Failed => None,
        }
    }

    /// Render the legacy tabular convention: -1 marks a failed aggregation
    ///
    /// Only the export boundary uses this; everything in-memory keeps the
    /// tagged form so the sentinel can never leak into arithmetic.
    pub fn sentinel(&self) -> f64 {
        match self {
            PopulationEstimate::Measured(v) => *v,
            PopulationEstimate::Failed => -1.0,
        }
    }
}

impl From<Option<f64>> for PopulationEstimate {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => PopulationEstimate::Measured(v),
            None => PopulationEstimate::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_rendering() {
        assert_eq!(PopulationEstimate::Measured(50000.0).sentinel(), 50000.0);
        assert_eq!(PopulationEstimate::Measured(0.0).sentinel(), 0.0);
        assert_eq!(PopulationEstimate::Failed.sentinel(), -1.0);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(PopulationEstimate::from(Some(12.5)), PopulationEstimate::Measured(12.5));
        assert_eq!(PopulationEstimate::from(None), PopulationEstimate::Failed);
    }

    #[test]
    fn test_failed_is_not_zero() {
        assert_ne!(PopulationEstimate::Failed, PopulationEstimate::Measured(0.0));
        assert_eq!(PopulationEstimate::Failed.measured(), None);
        assert_eq!(PopulationEstimate::Measured(0.0).measured(), Some(0.0));
    }
}
