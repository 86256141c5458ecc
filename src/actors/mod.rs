// ============================================================================
// Actors Module
// ============================================================================
//
// Actor-based infrastructure for background concerns.
//
// Note: Domain logic (Products, Vendors, Orders) uses CommandHandlers, NOT
//       actors. Actors are reserved for infrastructure concerns only.
//
// ============================================================================

mod health;
mod health_monitor;

pub use health::HealthStatus;
pub use health_monitor::{GetSystemHealth, HealthMonitorActor};
