// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order ID cannot be empty")]
    EmptyOrderId,

    #[error("Invalid order quantity: {0}")]
    InvalidQuantity(u64),

    #[error("Invalid order status: {0}")]
    InvalidStatus(String),

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Unknown vendor: {0}")]
    UnknownVendor(String),

    #[error("Order not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
