use crate::cli::DoctorArgs;
use crate::output::OutputWriter;
use anyhow::Result;
use console::style;
use isoreach_backends::{
    DateWindow, HealthStatus, IsochroneOutcome, OrsClient, RasterBackend, RasterServiceClient,
    RoutingBackend,
};
use isoreach_core::config::LayeredConfig;
use isoreach_core::models::TimeThreshold;

pub async fn execute(
    args: DoctorArgs,
    config: LayeredConfig,
    _output: &OutputWriter,
) -> Result<()> {
    println!("\n{}", style("Isoreach Health Check").bold().underlined());
    println!("{}", style("═".repeat(60)).dim());
    println!();

    let mut checks_passed = 0;
    let mut total_checks = 0;

    println!("{}", style("Routing Backend").bold());
    println!("{}", style("─".repeat(60)).dim());

    if args.verbose {
        println!("  Base URL: {}", config.ors_base_url.value);
        println!("  Profile: {}", config.ors_profile.value);
        println!("  Timeout: {}s", config.ors_timeout_secs.value);
    }

    let routing = OrsClient::from_config(&config);

    total_checks += 1;
    let mut routing_reachable = false;
    match routing.health().await {
        Ok(HealthStatus::Ready) => {
            println!("{} Routing backend: Ready", style("✓").green());
            checks_passed += 1;
            routing_reachable = true;
        }
        Ok(HealthStatus::Degraded(detail)) => {
            println!("{} Routing backend: {}", style("⚠").yellow(), detail);
            println!("  → The server answered but is not ready; isochrone requests may fail");
            routing_reachable = true;
        }
        Err(e) => {
            println!("{} Routing backend: {}", style("✗").red(), e);
            println!("  → Check that the routing server is running");
            println!(
                "  → Update routing.base_url in isoreach.toml (current: {})",
                config.ors_base_url.value
            );
        }
    }

    // A short-range probe catches a server that is up but has no road
    // network loaded for the operating region.
    total_checks += 1;
    if routing_reachable {
        match routing
            .isochrone(config.map_center_lat.value, config.map_center_lon.value, TimeThreshold(300))
            .await
        {
            Ok(IsochroneOutcome::Polygon(_)) => {
                println!("{} Isochrone probe: OK", style("✓").green());
                checks_passed += 1;
            }
            Ok(IsochroneOutcome::Empty) => {
                println!("{} Isochrone probe: empty response", style("⚠").yellow());
                println!("  → The configured map center may be outside the loaded road network");
            }
            Err(e) => {
                println!("{} Isochrone probe: {}", style("✗").red(), e);
            }
        }
    } else {
        println!("{} Isochrone probe: skipped (backend unreachable)", style("⚠").yellow());
    }

    println!();
    println!("{}", style("Raster Backend").bold());
    println!("{}", style("─".repeat(60)).dim());

    if args.verbose {
        println!("  Base URL: {}", config.raster_base_url.value);
        println!("  Dataset: {}", config.raster_dataset.value);
        println!(
            "  Reference window: {}..{}",
            config.reference_window_start.value, config.reference_window_end.value
        );
    }

    let raster = RasterServiceClient::from_config(&config);
    let window = DateWindow {
        start: config.reference_window_start.value,
        end: config.reference_window_end.value,
    };

    total_checks += 1;
    match raster.tile_count(&config.raster_dataset.value, &window).await {
        Ok(0) => {
            println!(
                "{} Raster dataset: reachable, but no tiles in the reference window",
                style("⚠").yellow()
            );
            println!("  → Reductions will fall back to the latest snapshot");
            checks_passed += 1;
        }
        Ok(count) => {
            println!(
                "{} Raster dataset: {} tiles in the reference window",
                style("✓").green(),
                count
            );
            checks_passed += 1;
        }
        Err(e) => {
            println!("{} Raster dataset: {}", style("✗").red(), e);
            println!("  → Check raster.base_url and raster.dataset in isoreach.toml");
        }
    }

    // Summary
    println!();
    println!("{}", style("═".repeat(60)).dim());

    let percentage = (checks_passed as f64 / total_checks as f64 * 100.0) as usize;
    let status_icon = if percentage >= 80 {
        style("✓").green()
    } else if percentage >= 50 {
        style("⚠").yellow()
    } else {
        style("✗").red()
    };

    println!(
        "{} Overall Status: {}/{} checks passed ({}%)",
        status_icon, checks_passed, total_checks, percentage
    );
    println!();

    if checks_passed < total_checks {
        println!(
            "{}",
            style("Some issues were found. Follow the suggestions above to fix them.").yellow()
        );
    } else {
        println!("{}", style("All checks passed. Both backends are reachable.").green());
    }

    Ok(())
}
