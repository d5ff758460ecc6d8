pub mod facility;
pub mod population;
pub mod result;
pub mod threshold;

pub use facility::Facility;
pub use population::PopulationEstimate;
pub use result::{FacilityResult, ThresholdResult};
pub use threshold::TimeThreshold;
