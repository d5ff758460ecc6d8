//! External service clients for isoreach
//!
//! The routing backend (isochrones) and the population raster backend are
//! consumed through explicit capability traits defined in [`ports`], so the
//! pipeline and its tests depend only on the interfaces. The concrete
//! reqwest clients live in [`ors`] and [`raster`].

mod http;
pub mod ors;
pub mod ports;
pub mod raster;

pub use ors::OrsClient;
pub use ports::{
    BackendError, BackendResult, DateWindow, HealthStatus, IsochroneOutcome, RasterBackend,
    ReduceQuery, RoutingBackend, Snapshot,
};
pub use raster::RasterServiceClient;
