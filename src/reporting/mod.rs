// ============================================================================
// Reporting Engine
// ============================================================================
//
// Read-side aggregation for the dashboard:
// - snapshot/   three full collection reads, normalized to canonical records
// - aggregates/ pure metric computations over a snapshot
// - report/     the structured output bundle
// - engine/     store-injected entry point with logging and metrics
//
// Nothing here mutates data or keeps state between renders.
//
// ============================================================================

mod aggregates;
mod engine;
mod report;
mod snapshot;

pub use aggregates::compute;
pub use engine::{ReportError, ReportingEngine};
pub use report::*;
pub use snapshot::Snapshot;
