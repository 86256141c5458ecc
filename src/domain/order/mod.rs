// ============================================================================
// Order Domain
// ============================================================================
//
// - Value objects (Order, OrderStatus, OrderDraft, date parsing)
// - Commands (Create, Update, Delete)
// - Errors (OrderError)
// - Command Handler (OrderCommandHandler)
//
// OrderID is a key but not a unique one: edits and deletes by ID touch
// every matching order.
//
// ============================================================================

pub mod value_objects;
pub mod commands;
pub mod errors;
pub mod command_handler;

pub use value_objects::*;
pub use commands::*;
pub use errors::*;
pub use command_handler::*;
