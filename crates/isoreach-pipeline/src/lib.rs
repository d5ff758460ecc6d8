//! The isoreach facility-processing pipeline
//!
//! Orchestrates the per-facility work against the routing and raster
//! backends: isochrone requests with bounded exponential-backoff retry,
//! per-threshold population aggregation, partial-failure bookkeeping, and
//! the sequential batch driver. Everything here runs strictly sequentially;
//! the only suspension points are awaited sleeps and in-flight requests.

pub mod batch;
pub mod isochrone;
pub mod population;
pub mod processor;
pub mod settings;

pub use batch::{run_batch, BatchSummary, FacilityOutcome};
pub use isochrone::{request_isochrone, RetryPolicy};
pub use population::{aggregate_population, RasterParams, MIN_RELIABLE_SCALE_M};
pub use processor::{process_facility, ColumnMap, FacilityRow};
pub use settings::PipelineSettings;
