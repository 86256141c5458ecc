use super::value_objects::ProductDraft;

// ============================================================================
// Product Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone)]
pub enum ProductCommand {
    Create(ProductDraft),
    Update {
        product_id: String,
        draft: ProductDraft,
    },
    Delete {
        product_id: String,
    },
}

impl ProductCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ProductCommand::Create(_) => "create",
            ProductCommand::Update { .. } => "update",
            ProductCommand::Delete { .. } => "delete",
        }
    }
}
