//! Sequential batch driver

use crate::processor::{process_facility, ColumnMap, FacilityRow};
use crate::settings::PipelineSettings;
use isoreach_backends::{BackendError, HealthStatus, RasterBackend, RoutingBackend};
use isoreach_core::error::{IsoreachError, Result};
use isoreach_core::models::FacilityResult;
use std::sync::atomic::{AtomicBool, Ordering};

/// Outcome of one facility's processing, for reporting
#[derive(Debug, Clone)]
pub struct FacilityOutcome {
    /// 0-based position in the input file
    pub index: usize,

    /// Facility name, or a row placeholder when the name was unresolvable
    pub label: String,

    pub succeeded: bool,
}

/// Summary of a batch run
#[derive(Debug, Clone)]
pub struct BatchSummary {
    /// Facilities that entered the batch
    pub total: usize,

    /// Per-facility outcomes, in input order
    pub outcomes: Vec<FacilityOutcome>,

    /// Whether the run stopped early on an interrupt
    pub interrupted: bool,
}

impl BatchSummary {
    fn new(total: usize) -> Self {
        Self { total, outcomes: Vec::new(), interrupted: false }
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded).count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.success_count() == self.total
    }
}

/// Run the facility batch sequentially, in input order
///
/// A facility's failure never aborts the batch; only an unreachable routing
/// backend at pre-flight does. The interrupt flag is observed between
/// facilities, so a ctrl-c finishes the in-flight facility and stops
/// cleanly. Results come back in input order, with failed facilities
/// omitted.
pub async fn run_batch(
    rows: &[FacilityRow],
    columns: &ColumnMap,
    routing: &dyn RoutingBackend,
    raster: &dyn RasterBackend,
    settings: &PipelineSettings,
    interrupt: &AtomicBool,
    mut on_facility: impl FnMut(&FacilityOutcome),
) -> Result<(Vec<FacilityResult>, BatchSummary)> {
    preflight(routing).await?;

    let mut results = Vec::new();
    let mut summary = BatchSummary::new(rows.len());

    tracing::info!("Processing {} facilities...", rows.len());

    for (i, row) in rows.iter().enumerate() {
        if interrupt.load(Ordering::SeqCst) {
            tracing::info!(
                "Interrupted; stopping after {} of {} facilities",
                summary.outcomes.len(),
                rows.len()
            );
            summary.interrupted = true;
            break;
        }

        // Politeness delay between facilities, on top of the per-threshold
        // delay inside the processor.
        if i > 0 {
            tokio::time::sleep(settings.sleep_between).await;
        }

        let label = columns
            .name
            .as_deref()
            .and_then(|c| row.get(c))
            .map(str::to_string)
            .unwrap_or_else(|| format!("row {}", row.index + 1));

        let outcome = match process_facility(row, columns, routing, raster, settings).await {
            Some(result) => {
                results.push(result);
                FacilityOutcome { index: row.index, label, succeeded: true }
            }
            None => FacilityOutcome { index: row.index, label, succeeded: false },
        };

        on_facility(&outcome);
        summary.outcomes.push(outcome);
    }

    tracing::info!(
        "Successfully processed {} out of {} facilities",
        summary.success_count(),
        summary.total
    );

    Ok((results, summary))
}

/// Check the routing backend before committing to the batch
///
/// A degraded answer is only a warning, since the isochrone calls may
/// still work; an unreachable host aborts with remediation steps.
async fn preflight(routing: &dyn RoutingBackend) -> Result<()> {
    match routing.health().await {
        Ok(HealthStatus::Ready) => Ok(()),
        Ok(HealthStatus::Degraded(detail)) => {
            tracing::warn!("Routing backend health check degraded: {}", detail);
            tracing::warn!("Continuing anyway, but isochrone requests may fail...");
            Ok(())
        }
        Err(BackendError::Transient(reason)) => {
            tracing::warn!("Routing backend health check failed: {}; continuing anyway", reason);
            Ok(())
        }
        Err(BackendError::Fatal(reason)) => Err(IsoreachError::RoutingUnavailable {
            reason,
            remediation: "verify the routing server is running and the configured base URL is \
                          current (run `isoreach doctor`)"
                .to_string(),
        }),
    }
}
