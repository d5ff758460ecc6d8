use crate::cli::AnalyzeArgs;
use crate::output::OutputWriter;
use crate::{export, ingest, map, progress};
use anyhow::Result;
use console::style;
use isoreach_backends::{OrsClient, RasterServiceClient};
use isoreach_core::config::{CliConfigOverrides, LayeredConfig};
use isoreach_pipeline::{run_batch, PipelineSettings};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
struct SummaryRow {
    #[tabled(rename = "Facility")]
    facility: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub async fn execute(
    args: AnalyzeArgs,
    mut config: LayeredConfig,
    output: &OutputWriter,
) -> Result<()> {
    config.update_from_cli(CliConfigOverrides {
        ors_base_url: args.ors_base_url,
        ors_api_key: args.ors_api_key,
        thresholds_secs: args.thresholds,
        sleep_between_requests_secs: args.sleep,
    });

    let table = ingest::load_facilities(&args.input)?;
    let rows = if args.no_level_filter {
        table.rows.clone()
    } else {
        ingest::filter_by_level(&table, &config.target_levels.value)?
    };

    if rows.is_empty() {
        output.error("No facilities to process after filtering");
        return Ok(());
    }
    output.info(format!("Processing {} of {} facilities", rows.len(), table.rows.len()));

    let routing = OrsClient::from_config(&config);
    let raster = RasterServiceClient::from_config(&config);
    let settings = PipelineSettings::from_config(&config);

    // Ctrl-c flips a flag the batch loop observes between facilities, so
    // the in-flight facility completes before the run stops.
    let interrupt = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&interrupt);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received; finishing the current facility...");
                flag.store(true, Ordering::SeqCst);
            }
        });
    }

    let bar = progress::create_progress_bar(rows.len() as u64, "Processing facilities");
    let (results, summary) = run_batch(
        &rows,
        &table.columns,
        &routing,
        &raster,
        &settings,
        &interrupt,
        |outcome| {
            let mark = if outcome.succeeded {
                style("✓").green().to_string()
            } else {
                style("✗").red().to_string()
            };
            bar.println(format!("{} {}", mark, outcome.label));
            bar.inc(1);
        },
    )
    .await?;
    progress::finish_success(
        &bar,
        &format!("{} of {} facilities succeeded", summary.success_count(), summary.total),
    );

    if results.is_empty() {
        output.warning("No results to save");
    } else {
        export::write_results_csv(&args.output_csv, &results, &table.headers, &settings.thresholds)?;
        output.success(format!("Saved results to {}", args.output_csv.display()));

        let map_style = map::MapStyle::from_config(&config);
        let (overlays, markers) = map::overlays_from_results(&results, &map_style);
        map::write_map(
            &args.output_map,
            "Facility drive-time coverage",
            &overlays,
            &markers,
            &map_style,
        )?;
        output.success(format!("Saved map to {}", args.output_map.display()));
    }

    output.section("Batch Summary");
    output.kv("Total", summary.total);
    output.kv("Succeeded", summary.success_count());
    output.kv("Failed", summary.failure_count());
    output.table(
        summary
            .outcomes
            .iter()
            .map(|o| SummaryRow {
                facility: o.label.clone(),
                status: if o.succeeded { "ok".to_string() } else { "failed".to_string() },
            })
            .collect(),
    );

    if summary.interrupted {
        output.warning("Run interrupted; partial results were saved");
    }

    Ok(())
}
