use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Isoreach - drive-time population coverage for point facilities
#[derive(Parser, Debug)]
#[command(name = "isoreach")]
#[command(about = "Drive-time population coverage for point facilities", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to a TOML config file (defaults to ./isoreach.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a facility table: one isochrone and population sum per
    /// configured threshold, exported as CSV and an interactive map
    Analyze(AnalyzeArgs),

    /// Generate an isochrone map for a single location
    Isochrone(IsochroneArgs),

    /// Run backend health checks and diagnostics
    Doctor(DoctorArgs),
}

#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Facility CSV file
    pub input: PathBuf,

    /// Output CSV path
    #[arg(long, default_value = "population_analysis_results.csv")]
    pub output_csv: PathBuf,

    /// Output map path
    #[arg(long, default_value = "isochrone_map.html")]
    pub output_map: PathBuf,

    /// Override the routing backend base URL
    #[arg(long)]
    pub ors_base_url: Option<String>,

    /// Override the routing backend API key
    #[arg(long)]
    pub ors_api_key: Option<String>,

    /// Override the time thresholds in seconds (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub thresholds: Option<Vec<u32>>,

    /// Override the politeness delay between requests, in seconds
    #[arg(long)]
    pub sleep: Option<f64>,

    /// Process every row regardless of facility level
    #[arg(long)]
    pub no_level_filter: bool,
}

#[derive(Parser, Debug)]
pub struct IsochroneArgs {
    /// Latitude of the location (WGS84)
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude of the location (WGS84)
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Facility name shown on the map
    #[arg(long, default_value = "Facility")]
    pub name: String,

    /// Time thresholds in seconds (comma-separated; defaults to the
    /// configured analysis thresholds)
    #[arg(long, value_delimiter = ',')]
    pub range: Option<Vec<u32>>,

    /// Output map path (defaults to isochrone_<name>.html)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct DoctorArgs {
    /// Show detailed information for each check
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
