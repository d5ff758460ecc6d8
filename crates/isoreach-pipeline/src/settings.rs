//! Run settings derived once from the layered configuration

use crate::isochrone::RetryPolicy;
use crate::population::RasterParams;
use isoreach_core::config::LayeredConfig;
use isoreach_core::models::TimeThreshold;
use isoreach_geo::SwapRule;
use std::time::Duration;

/// Everything the pipeline needs for a run, resolved from configuration
///
/// Built once at startup and passed by reference; components never reach
/// into global state, and tests substitute fields directly.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Configured time thresholds, in request order
    pub thresholds: Vec<TimeThreshold>,

    /// Politeness delay between outbound requests
    pub sleep_between: Duration,

    /// Regional lat/lon transposition rule, if enabled
    pub swap: Option<SwapRule>,

    pub retry: RetryPolicy,

    pub raster: RasterParams,
}

impl PipelineSettings {
    pub fn from_config(config: &LayeredConfig) -> Self {
        let swap = config
            .swap_enabled
            .value
            .then(|| SwapRule::new(config.swap_lat_above.value, config.swap_lon_below.value));

        Self {
            thresholds: config.thresholds_secs.value.iter().copied().map(TimeThreshold).collect(),
            sleep_between: Duration::from_secs_f64(config.sleep_between_requests_secs.value),
            swap,
            retry: RetryPolicy::from_config(config),
            raster: RasterParams::from_config(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_config() {
        let settings = PipelineSettings::from_config(&LayeredConfig::with_defaults());
        assert_eq!(
            settings.thresholds,
            vec![TimeThreshold(900), TimeThreshold(1800), TimeThreshold(2700)]
        );
        assert_eq!(settings.retry.max_attempts, 3);
        assert_eq!(settings.sleep_between, Duration::from_millis(500));
        let swap = settings.swap.expect("swap rule enabled by default");
        assert_eq!(swap.lat_above, 10.0);
        assert_eq!(swap.lon_below, -5.0);
    }

    #[test]
    fn test_swap_can_be_disabled() {
        let mut config = LayeredConfig::with_defaults();
        config.swap_enabled.value = false;
        let settings = PipelineSettings::from_config(&config);
        assert!(settings.swap.is_none());
    }
}
