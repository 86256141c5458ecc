// ============================================================================
// Domain Layer - Supply Chain Records
// ============================================================================
//
// One subdirectory per entity, each with:
// - Value objects (canonical record, normalization, form draft)
// - Commands
// - Errors
// - Command handler (CRUD facade over the document store)
//
// The reporting engine only ever sees the canonical records defined here.
//
// ============================================================================

pub mod record;
pub mod product;
pub mod vendor;
pub mod order;

pub use record::{Normalized, RecordError};
