//! Isochrone requests with bounded exponential-backoff retry

use isoreach_backends::{BackendError, IsochroneOutcome, RoutingBackend};
use isoreach_core::config::LayeredConfig;
use isoreach_core::models::TimeThreshold;
use std::time::Duration;

/// Retry behavior for transient routing-backend errors
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles each retry
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self {
            max_attempts: config.retry_max_attempts.value,
            base_delay: Duration::from_secs_f64(config.retry_base_delay_secs.value),
        }
    }

    /// Backoff before the attempt after `attempt` (0-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Request the drive-time polygon for one (location, threshold) pair
///
/// Transient errors are retried with exponential backoff up to the policy's
/// attempt budget, then swallowed into `None` so batch processing can
/// continue. An empty response and a fatally rejected request are also
/// `None`, without retrying. Only programming errors propagate (as panics).
pub async fn request_isochrone(
    routing: &dyn RoutingBackend,
    lat: f64,
    lon: f64,
    range: TimeThreshold,
    retry: &RetryPolicy,
) -> Option<geojson::Geometry> {
    for attempt in 0..retry.max_attempts {
        tracing::debug!(
            "Requesting isochrone for ({}, {}), attempt {}/{}",
            lat,
            lon,
            attempt + 1,
            retry.max_attempts
        );

        match routing.isochrone(lat, lon, range).await {
            Ok(IsochroneOutcome::Polygon(geometry)) => {
                tracing::debug!("Successfully generated isochrone for ({}, {})", lat, lon);
                return Some(geometry);
            }
            Ok(IsochroneOutcome::Empty) => {
                tracing::warn!(
                    "Isochrone response for ({}, {}) at {} carried no features",
                    lat,
                    lon,
                    range
                );
                return None;
            }
            Err(BackendError::Fatal(reason)) => {
                tracing::error!(
                    "Routing backend rejected isochrone request for ({}, {}): {}",
                    lat,
                    lon,
                    reason
                );
                return None;
            }
            Err(BackendError::Transient(reason)) => {
                if attempt + 1 < retry.max_attempts {
                    let wait = retry.backoff_delay(attempt);
                    tracing::warn!(
                        "Error generating isochrone for ({}, {}), attempt {}/{}: {}. Retrying in {:.1}s...",
                        lat,
                        lon,
                        attempt + 1,
                        retry.max_attempts,
                        reason,
                        wait.as_secs_f64()
                    );
                    tokio::time::sleep(wait).await;
                } else {
                    tracing::error!(
                        "Failed to generate isochrone for ({}, {}) after {} attempts: {}",
                        lat,
                        lon,
                        retry.max_attempts,
                        reason
                    );
                }
            }
        }
    }

    None
}
