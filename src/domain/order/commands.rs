use super::value_objects::OrderDraft;

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone)]
pub enum OrderCommand {
    Create(OrderDraft),
    /// Applies to every order sharing `order_id`
    Update {
        order_id: String,
        draft: OrderDraft,
    },
    Delete {
        order_id: String,
    },
}

impl OrderCommand {
    pub fn name(&self) -> &'static str {
        match self {
            OrderCommand::Create(_) => "create",
            OrderCommand::Update { .. } => "update",
            OrderCommand::Delete { .. } => "delete",
        }
    }
}
