use crate::cli::IsochroneArgs;
use crate::output::OutputWriter;
use crate::{map, progress};
use anyhow::Result;
use isoreach_backends::OrsClient;
use isoreach_core::config::LayeredConfig;
use isoreach_core::models::TimeThreshold;
use isoreach_geo::{validate_range, SwapRule};
use isoreach_pipeline::{request_isochrone, RetryPolicy};
use std::path::PathBuf;
use std::time::Duration;

pub async fn execute(
    args: IsochroneArgs,
    config: LayeredConfig,
    output: &OutputWriter,
) -> Result<()> {
    let (lat, lon) = if config.swap_enabled.value {
        SwapRule::new(config.swap_lat_above.value, config.swap_lon_below.value)
            .apply(args.lat, args.lon)
    } else {
        (args.lat, args.lon)
    };
    let (lat, lon) = validate_range(lat, lon)?;

    let ranges: Vec<TimeThreshold> = args
        .range
        .unwrap_or_else(|| config.thresholds_secs.value.clone())
        .into_iter()
        .map(TimeThreshold)
        .collect();

    output.info(format!("Generating isochrones for {} at ({}, {})", args.name, lat, lon));

    let routing = OrsClient::from_config(&config);
    let retry = RetryPolicy::from_config(&config);
    let sleep = Duration::from_secs_f64(config.sleep_between_requests_secs.value);

    let mut style = map::MapStyle::from_config(&config);
    // Single-facility maps center on the facility, zoomed in.
    style.center_lat = lat;
    style.center_lon = lon;
    style.zoom = 11;

    let spinner = progress::create_spinner("Requesting isochrones from the routing backend...");
    let mut overlays = Vec::new();
    for (i, &range) in ranges.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(sleep).await;
        }
        match request_isochrone(&routing, lat, lon, range, &retry).await {
            Some(geometry) => overlays.push(map::MapOverlay {
                label: format!("{} - {} driving area", args.name, range),
                color: style.color_for(range.minutes()),
                minutes: Some(range.minutes()),
                outline: false,
                geometry,
            }),
            None => spinner.println(format!("✗ No isochrone at {}", range)),
        }
    }

    if overlays.is_empty() {
        progress::finish_error(&spinner, "Failed to generate isochrones");
        anyhow::bail!(
            "could not generate any isochrone; check the routing server connection \
             (run `isoreach doctor`)"
        );
    }
    progress::finish_success(&spinner, &format!("Generated {} isochrones", overlays.len()));

    let marker = map::MapMarker {
        lat,
        lon,
        popup: format!("<b>{}</b><br>Coordinates: {}, {}", args.name, lat, lon),
        tooltip: args.name.clone(),
    };

    let output_path = args.output.unwrap_or_else(|| {
        let safe_name = args.name.replace([' ', '/'], "_");
        PathBuf::from(format!("isochrone_{}.html", safe_name))
    });
    map::write_map(&output_path, &args.name, &overlays, &[marker], &style)?;
    output.success(format!("Map saved to: {}", output_path.display()));

    Ok(())
}
