use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::metrics::Metrics;
use crate::store::DocumentStore;
use super::aggregates::compute;
use super::report::DashboardReport;
use super::snapshot::Snapshot;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// A collection read failed; the whole render fails with it
    #[error(transparent)]
    StoreRead(#[from] anyhow::Error),
}

/// Entry point for a dashboard render. Holds only the injected store handle.
pub struct ReportingEngine {
    store: Arc<dyn DocumentStore>,
    metrics: Arc<Metrics>,
}

impl ReportingEngine {
    pub fn new(store: Arc<dyn DocumentStore>, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics }
    }

    pub async fn render(&self) -> Result<DashboardReport, ReportError> {
        let render_id = Uuid::new_v4();
        let started = Instant::now();

        let result = async {
            let snapshot = Snapshot::load(self.store.as_ref()).await?;
            self.metrics.record_snapshot(
                (snapshot.products.len(), snapshot.vendors.len(), snapshot.orders.len()),
                &snapshot.skipped,
            );

            if snapshot.skipped.total_invalid() > 0 {
                tracing::warn!(
                    skipped_products = snapshot.skipped.products,
                    skipped_vendors = snapshot.skipped.vendors,
                    skipped_orders = snapshot.skipped.orders,
                    "Some records were left out of the report"
                );
            }
            if snapshot.skipped.total_incomplete() > 0 {
                tracing::info!(
                    incomplete_products = snapshot.skipped.incomplete_products,
                    incomplete_vendors = snapshot.skipped.incomplete_vendors,
                    incomplete_orders = snapshot.skipped.incomplete_orders,
                    "Some records have unusable fields"
                );
            }

            Ok::<_, ReportError>(compute(&snapshot))
        }
        .instrument(tracing::info_span!("dashboard_render", %render_id))
        .await;

        let elapsed = started.elapsed();
        self.metrics.record_render(elapsed.as_secs_f64(), result.is_ok());

        match &result {
            Ok(report) => tracing::info!(
                render_id = %render_id,
                products = report.counts.products,
                vendors = report.counts.vendors,
                orders = report.counts.orders,
                elapsed_ms = elapsed.as_millis() as u64,
                "📊 Dashboard rendered"
            ),
            Err(e) => tracing::error!(render_id = %render_id, error = %e, "Dashboard render failed"),
        }

        result
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
