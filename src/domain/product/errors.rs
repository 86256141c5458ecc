// ============================================================================
// Product Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Product ID cannot be empty")]
    EmptyProductId,

    #[error("Product name cannot be empty")]
    EmptyName,

    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    #[error("Product already exists: {0}")]
    AlreadyExists(String),

    #[error("Product not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
