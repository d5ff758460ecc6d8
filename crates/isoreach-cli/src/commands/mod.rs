//! Command implementations

mod analyze;
mod doctor;
mod isochrone;

use crate::cli::{Cli, Commands};
use crate::config_loader;
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = config_loader::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze(args) => analyze::execute(args, config, &output).await,
        Commands::Isochrone(args) => isochrone::execute(args, config, &output).await,
        Commands::Doctor(args) => doctor::execute(args, config, &output).await,
    }
}
