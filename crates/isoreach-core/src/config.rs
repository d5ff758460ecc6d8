use crate::error::{IsoreachError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered run configuration for isoreach
///
/// Constructed once at process start (defaults, then file, then environment,
/// then CLI overrides) and passed by reference into every component that
/// needs it. No global state.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    // Routing backend
    pub ors_base_url: ConfigValue<String>,
    pub ors_api_key: ConfigValue<String>,
    pub ors_profile: ConfigValue<String>,
    pub ors_timeout_secs: ConfigValue<u64>,
    pub retry_max_attempts: ConfigValue<u32>,
    pub retry_base_delay_secs: ConfigValue<f64>,

    // Raster backend
    pub raster_base_url: ConfigValue<String>,
    pub raster_dataset: ConfigValue<String>,
    pub raster_scale_m: ConfigValue<u32>,
    pub raster_max_pixels: ConfigValue<u64>,
    pub reference_window_start: ConfigValue<NaiveDate>,
    pub reference_window_end: ConfigValue<NaiveDate>,

    // Analysis
    pub thresholds_secs: ConfigValue<Vec<u32>>,
    pub sleep_between_requests_secs: ConfigValue<f64>,
    pub target_levels: ConfigValue<Vec<String>>,
    pub swap_enabled: ConfigValue<bool>,
    pub swap_lat_above: ConfigValue<f64>,
    pub swap_lon_below: ConfigValue<f64>,

    // Map artifact
    pub map_center_lat: ConfigValue<f64>,
    pub map_center_lon: ConfigValue<f64>,
    pub map_zoom: ConfigValue<u32>,
    pub map_opacity: ConfigValue<f64>,
    /// Overlay fill colors keyed by threshold minutes
    pub map_colors: ConfigValue<BTreeMap<u32, String>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    ///
    /// The swap-rule defaults describe the Kenya deployment the tool was
    /// built for (latitude band roughly [-5, 6], longitude band [34, 42]);
    /// other regions override them in the config file.
    pub fn with_defaults() -> Self {
        let mut colors = BTreeMap::new();
        colors.insert(15, "#ff0000".to_string());
        colors.insert(30, "#ff8800".to_string());
        colors.insert(45, "#ffaa00".to_string());

        Self {
            ors_base_url: ConfigValue::new(
                "http://localhost:8080/ors".to_string(),
                ConfigSource::Default,
            ),
            ors_api_key: ConfigValue::new(String::new(), ConfigSource::Default),
            ors_profile: ConfigValue::new("driving-car".to_string(), ConfigSource::Default),
            ors_timeout_secs: ConfigValue::new(30, ConfigSource::Default),
            retry_max_attempts: ConfigValue::new(3, ConfigSource::Default),
            retry_base_delay_secs: ConfigValue::new(1.0, ConfigSource::Default),

            raster_base_url: ConfigValue::new(
                "http://localhost:9090".to_string(),
                ConfigSource::Default,
            ),
            raster_dataset: ConfigValue::new("WorldPop/GP/100m/pop".to_string(), ConfigSource::Default),
            raster_scale_m: ConfigValue::new(100, ConfigSource::Default),
            raster_max_pixels: ConfigValue::new(1_000_000_000, ConfigSource::Default),
            reference_window_start: ConfigValue::new(
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                ConfigSource::Default,
            ),
            reference_window_end: ConfigValue::new(
                NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
                ConfigSource::Default,
            ),

            thresholds_secs: ConfigValue::new(vec![900, 1800, 2700], ConfigSource::Default),
            sleep_between_requests_secs: ConfigValue::new(0.5, ConfigSource::Default),
            target_levels: ConfigValue::new(
                vec!["4".to_string(), "5".to_string(), "6".to_string()],
                ConfigSource::Default,
            ),
            swap_enabled: ConfigValue::new(true, ConfigSource::Default),
            swap_lat_above: ConfigValue::new(10.0, ConfigSource::Default),
            swap_lon_below: ConfigValue::new(-5.0, ConfigSource::Default),

            map_center_lat: ConfigValue::new(0.0236, ConfigSource::Default),
            map_center_lon: ConfigValue::new(37.9062, ConfigSource::Default),
            map_zoom: ConfigValue::new(6, ConfigSource::Default),
            map_opacity: ConfigValue::new(0.3, ConfigSource::Default),
            map_colors: ConfigValue::new(colors, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| IsoreachError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| IsoreachError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(routing) = file_config.routing {
            if let Some(v) = routing.base_url {
                self.ors_base_url.update(v, ConfigSource::File);
            }
            if let Some(v) = routing.api_key {
                self.ors_api_key.update(v, ConfigSource::File);
            }
            if let Some(v) = routing.profile {
                self.ors_profile.update(v, ConfigSource::File);
            }
            if let Some(v) = routing.timeout_secs {
                self.ors_timeout_secs.update(v, ConfigSource::File);
            }
            if let Some(v) = routing.retry_max_attempts {
                self.retry_max_attempts.update(v, ConfigSource::File);
            }
            if let Some(v) = routing.retry_base_delay_secs {
                self.retry_base_delay_secs.update(v, ConfigSource::File);
            }
        }

        if let Some(raster) = file_config.raster {
            if let Some(v) = raster.base_url {
                self.raster_base_url.update(v, ConfigSource::File);
            }
            if let Some(v) = raster.dataset {
                self.raster_dataset.update(v, ConfigSource::File);
            }
            if let Some(v) = raster.scale_m {
                self.raster_scale_m.update(v, ConfigSource::File);
            }
            if let Some(v) = raster.max_pixels {
                self.raster_max_pixels.update(v, ConfigSource::File);
            }
            if let Some(v) = raster.reference_window_start {
                self.reference_window_start.update(v, ConfigSource::File);
            }
            if let Some(v) = raster.reference_window_end {
                self.reference_window_end.update(v, ConfigSource::File);
            }
        }

        if let Some(analysis) = file_config.analysis {
            if let Some(v) = analysis.thresholds_secs {
                self.thresholds_secs.update(v, ConfigSource::File);
            }
            if let Some(v) = analysis.sleep_between_requests_secs {
                self.sleep_between_requests_secs.update(v, ConfigSource::File);
            }
            if let Some(v) = analysis.target_levels {
                self.target_levels.update(v, ConfigSource::File);
            }
            if let Some(v) = analysis.swap_enabled {
                self.swap_enabled.update(v, ConfigSource::File);
            }
            if let Some(v) = analysis.swap_lat_above {
                self.swap_lat_above.update(v, ConfigSource::File);
            }
            if let Some(v) = analysis.swap_lon_below {
                self.swap_lon_below.update(v, ConfigSource::File);
            }
        }

        if let Some(map) = file_config.map {
            if let Some(v) = map.center_lat {
                self.map_center_lat.update(v, ConfigSource::File);
            }
            if let Some(v) = map.center_lon {
                self.map_center_lon.update(v, ConfigSource::File);
            }
            if let Some(v) = map.zoom {
                self.map_zoom.update(v, ConfigSource::File);
            }
            if let Some(v) = map.opacity {
                self.map_opacity.update(v, ConfigSource::File);
            }
            if let Some(raw) = map.colors {
                match parse_color_map(&raw) {
                    Ok(colors) => self.map_colors.update(colors, ConfigSource::File),
                    Err(e) => tracing::warn!("Ignoring invalid [map.colors] table: {}", e),
                }
            }
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Ok(v) = env::var("ISOREACH_ORS_BASE_URL") {
            self.ors_base_url.update(v, ConfigSource::Environment);
        }
        if let Ok(v) = env::var("ISOREACH_ORS_API_KEY") {
            self.ors_api_key.update(v, ConfigSource::Environment);
        }
        if let Ok(v) = env::var("ISOREACH_ORS_PROFILE") {
            self.ors_profile.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_parse::<u64>("ISOREACH_ORS_TIMEOUT_SECS") {
            self.ors_timeout_secs.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_parse::<u32>("ISOREACH_RETRY_MAX_ATTEMPTS") {
            self.retry_max_attempts.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_parse::<f64>("ISOREACH_RETRY_BASE_DELAY_SECS") {
            self.retry_base_delay_secs.update(v, ConfigSource::Environment);
        }

        if let Ok(v) = env::var("ISOREACH_RASTER_BASE_URL") {
            self.raster_base_url.update(v, ConfigSource::Environment);
        }
        if let Ok(v) = env::var("ISOREACH_RASTER_DATASET") {
            self.raster_dataset.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_parse::<u32>("ISOREACH_RASTER_SCALE_M") {
            self.raster_scale_m.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_parse::<u64>("ISOREACH_RASTER_MAX_PIXELS") {
            self.raster_max_pixels.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_parse::<NaiveDate>("ISOREACH_REFERENCE_WINDOW_START") {
            self.reference_window_start.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_parse::<NaiveDate>("ISOREACH_REFERENCE_WINDOW_END") {
            self.reference_window_end.update(v, ConfigSource::Environment);
        }

        if let Some(v) = env_parse_list::<u32>("ISOREACH_THRESHOLDS_SECS") {
            self.thresholds_secs.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_parse::<f64>("ISOREACH_SLEEP_BETWEEN_REQUESTS_SECS") {
            self.sleep_between_requests_secs.update(v, ConfigSource::Environment);
        }
        if let Ok(raw) = env::var("ISOREACH_TARGET_LEVELS") {
            let levels: Vec<String> = raw.split(',').map(|s| s.trim().to_string()).collect();
            self.target_levels.update(levels, ConfigSource::Environment);
        }
        if let Some(v) = env_parse::<bool>("ISOREACH_SWAP_ENABLED") {
            self.swap_enabled.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_parse::<f64>("ISOREACH_SWAP_LAT_ABOVE") {
            self.swap_lat_above.update(v, ConfigSource::Environment);
        }
        if let Some(v) = env_parse::<f64>("ISOREACH_SWAP_LON_BELOW") {
            self.swap_lon_below.update(v, ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(v) = overrides.ors_base_url {
            self.ors_base_url.update(v, ConfigSource::Cli);
        }
        if let Some(v) = overrides.ors_api_key {
            self.ors_api_key.update(v, ConfigSource::Cli);
        }
        if let Some(v) = overrides.thresholds_secs {
            self.thresholds_secs.update(v, ConfigSource::Cli);
        }
        if let Some(v) = overrides.sleep_between_requests_secs {
            self.sleep_between_requests_secs.update(v, ConfigSource::Cli);
        }
    }
}

/// Parse an environment variable, warning on malformed values
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Invalid {} value '{}'", key, raw);
            None
        }
    }
}

/// Parse a comma-separated environment variable, warning on malformed values
fn env_parse_list<T: FromStr>(key: &str) -> Option<Vec<T>> {
    let raw = env::var(key).ok()?;
    let parsed: std::result::Result<Vec<T>, _> =
        raw.split(',').map(|s| s.trim().parse::<T>()).collect();
    match parsed {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Invalid {} value '{}': expected comma-separated list", key, raw);
            None
        }
    }
}

/// Parse a string-keyed color table into minutes-keyed form
fn parse_color_map(raw: &BTreeMap<String, String>) -> Result<BTreeMap<u32, String>> {
    let mut colors = BTreeMap::new();
    for (key, color) in raw {
        let minutes = key.parse::<u32>().map_err(|_| IsoreachError::ConfigInvalid {
            key: format!("map.colors.{}", key),
            reason: "color keys must be threshold minutes".to_string(),
        })?;
        colors.insert(minutes, color.clone());
    }
    Ok(colors)
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    routing: Option<RoutingSection>,
    raster: Option<RasterSection>,
    analysis: Option<AnalysisSection>,
    map: Option<MapSection>,
}

#[derive(Debug, Deserialize, Serialize)]
struct RoutingSection {
    base_url: Option<String>,
    api_key: Option<String>,
    profile: Option<String>,
    timeout_secs: Option<u64>,
    retry_max_attempts: Option<u32>,
    retry_base_delay_secs: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize)]
struct RasterSection {
    base_url: Option<String>,
    dataset: Option<String>,
    scale_m: Option<u32>,
    max_pixels: Option<u64>,
    reference_window_start: Option<NaiveDate>,
    reference_window_end: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Serialize)]
struct AnalysisSection {
    thresholds_secs: Option<Vec<u32>>,
    sleep_between_requests_secs: Option<f64>,
    target_levels: Option<Vec<String>>,
    swap_enabled: Option<bool>,
    swap_lat_above: Option<f64>,
    swap_lon_below: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize)]
struct MapSection {
    center_lat: Option<f64>,
    center_lon: Option<f64>,
    zoom: Option<u32>,
    opacity: Option<f64>,
    colors: Option<BTreeMap<String, String>>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub ors_base_url: Option<String>,
    pub ors_api_key: Option<String>,
    pub thresholds_secs: Option<Vec<u32>>,
    pub sleep_between_requests_secs: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.ors_base_url.value, "http://localhost:8080/ors");
        assert_eq!(config.ors_base_url.source, ConfigSource::Default);
        assert_eq!(config.thresholds_secs.value, vec![900, 1800, 2700]);
        assert_eq!(config.retry_max_attempts.value, 3);
        assert_eq!(config.swap_lat_above.value, 10.0);
        assert_eq!(config.swap_lon_below.value, -5.0);
        assert_eq!(config.map_colors.value.get(&15).unwrap(), "#ff0000");
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        // CLI should override environment
        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400); // Still CLI value
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r##"
[routing]
base_url = "http://10.0.0.5:8080/ors"
retry_max_attempts = 5

[analysis]
thresholds_secs = [900, 2700]
target_levels = ["5", "6"]

[map.colors]
"15" = "#00ff00"
"##
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.ors_base_url.value, "http://10.0.0.5:8080/ors");
        assert_eq!(config.ors_base_url.source, ConfigSource::File);
        assert_eq!(config.retry_max_attempts.value, 5);
        assert_eq!(config.thresholds_secs.value, vec![900, 2700]);
        assert_eq!(config.target_levels.value, vec!["5", "6"]);
        assert_eq!(config.map_colors.value.get(&15).unwrap(), "#00ff00");
        // Untouched values keep their defaults
        assert_eq!(config.ors_profile.value, "driving-car");
        assert_eq!(config.ors_profile.source, ConfigSource::Default);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let result = LayeredConfig::with_defaults().load_from_file("/nonexistent/isoreach.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        let overrides = CliConfigOverrides {
            ors_base_url: Some("http://ors.example.com".to_string()),
            ors_api_key: None,
            thresholds_secs: Some(vec![600]),
            sleep_between_requests_secs: None,
        };

        config.update_from_cli(overrides);

        assert_eq!(config.ors_base_url.value, "http://ors.example.com");
        assert_eq!(config.ors_base_url.source, ConfigSource::Cli);
        assert_eq!(config.thresholds_secs.value, vec![600]);
        // These should still be defaults
        assert_eq!(config.ors_api_key.source, ConfigSource::Default);
        assert_eq!(config.sleep_between_requests_secs.source, ConfigSource::Default);
    }

    #[test]
    fn test_parse_color_map() {
        let mut raw = BTreeMap::new();
        raw.insert("15".to_string(), "#ff0000".to_string());
        raw.insert("30".to_string(), "#ff8800".to_string());
        let colors = parse_color_map(&raw).unwrap();
        assert_eq!(colors.get(&15).unwrap(), "#ff0000");
        assert_eq!(colors.get(&30).unwrap(), "#ff8800");

        raw.insert("fast".to_string(), "#000000".to_string());
        assert!(parse_color_map(&raw).is_err());
    }
}
