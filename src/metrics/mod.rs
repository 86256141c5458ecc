// Private module declaration
mod server;

use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};

use crate::reporting::SkippedRecords;

// Re-export for public API
pub use server::metrics_handler;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Dashboard renders (count, latency, outcome)
// - Record quality (skipped records, undated orders, snapshot sizes)
// - CRUD commands and CSV imports
// - Document store health
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Reporting Metrics
    pub dashboard_renders: IntCounterVec,
    pub dashboard_render_duration: Histogram,
    pub skipped_records: IntCounterVec,
    pub incomplete_records: IntCounterVec,
    pub undated_orders: IntCounter,
    pub snapshot_records: IntGaugeVec,

    // CRUD Metrics
    pub commands_total: IntCounterVec,
    pub rows_imported: IntCounterVec,

    // Store Metrics
    pub store_health_status: IntGauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Reporting Metrics
        let dashboard_renders = IntCounterVec::new(
            Opts::new("dashboard_renders_total", "Total dashboard renders"),
            &["outcome"],
        )?;
        registry.register(Box::new(dashboard_renders.clone()))?;

        let dashboard_render_duration = Histogram::with_opts(
            HistogramOpts::new("dashboard_render_duration_seconds", "Dashboard render duration")
                .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0]),
        )?;
        registry.register(Box::new(dashboard_render_duration.clone()))?;

        let skipped_records = IntCounterVec::new(
            Opts::new("report_skipped_records_total", "Records skipped for lack of a key"),
            &["collection"],
        )?;
        registry.register(Box::new(skipped_records.clone()))?;

        let incomplete_records = IntCounterVec::new(
            Opts::new("report_incomplete_records_total", "Records kept with one or more unusable fields"),
            &["collection"],
        )?;
        registry.register(Box::new(incomplete_records.clone()))?;

        let undated_orders = IntCounter::new(
            "report_undated_orders_total",
            "Orders left out of the monthly volume for lack of a parseable date",
        )?;
        registry.register(Box::new(undated_orders.clone()))?;

        let snapshot_records = IntGaugeVec::new(
            Opts::new("snapshot_records", "Normalized records in the latest dashboard snapshot"),
            &["collection"],
        )?;
        registry.register(Box::new(snapshot_records.clone()))?;

        // CRUD Metrics
        let commands_total = IntCounterVec::new(
            Opts::new("crud_commands_total", "CRUD commands handled"),
            &["entity", "command", "outcome"],
        )?;
        registry.register(Box::new(commands_total.clone()))?;

        let rows_imported = IntCounterVec::new(
            Opts::new("csv_rows_imported_total", "Rows inserted through CSV upload"),
            &["entity"],
        )?;
        registry.register(Box::new(rows_imported.clone()))?;

        // Store Metrics
        let store_health_status = IntGauge::new(
            "store_health_status",
            "Document store health (0=Unhealthy, 1=Degraded, 2=Healthy)",
        )?;
        registry.register(Box::new(store_health_status.clone()))?;

        Ok(Self {
            registry,
            dashboard_renders,
            dashboard_render_duration,
            skipped_records,
            incomplete_records,
            undated_orders,
            snapshot_records,
            commands_total,
            rows_imported,
            store_health_status,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a dashboard render
    pub fn record_render(&self, duration_secs: f64, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.dashboard_renders.with_label_values(&[outcome]).inc();
        self.dashboard_render_duration.observe(duration_secs);
    }

    /// Helper to record snapshot sizes and record quality
    pub fn record_snapshot(&self, counts: (usize, usize, usize), skipped: &SkippedRecords) {
        let (products, vendors, orders) = counts;
        self.snapshot_records.with_label_values(&["products"]).set(products as i64);
        self.snapshot_records.with_label_values(&["vendors"]).set(vendors as i64);
        self.snapshot_records.with_label_values(&["orders"]).set(orders as i64);

        self.skipped_records.with_label_values(&["products"]).inc_by(skipped.products as u64);
        self.skipped_records.with_label_values(&["vendors"]).inc_by(skipped.vendors as u64);
        self.skipped_records.with_label_values(&["orders"]).inc_by(skipped.orders as u64);
        self.incomplete_records.with_label_values(&["products"]).inc_by(skipped.incomplete_products as u64);
        self.incomplete_records.with_label_values(&["vendors"]).inc_by(skipped.incomplete_vendors as u64);
        self.incomplete_records.with_label_values(&["orders"]).inc_by(skipped.incomplete_orders as u64);
        self.undated_orders.inc_by(skipped.undated_orders as u64);
    }

    /// Helper to record a CRUD command outcome
    pub fn record_command(&self, entity: &str, command: &str, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.commands_total.with_label_values(&[entity, command, outcome]).inc();
    }

    /// Helper to record a CSV upload
    pub fn record_import(&self, entity: &str, rows: usize) {
        self.rows_imported.with_label_values(&[entity]).inc_by(rows as u64);
    }

    /// Helper to update store health state
    pub fn update_store_health(&self, state: u8) {
        self.store_health_status.set(state as i64);
    }
}
