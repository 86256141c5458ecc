use std::sync::Arc;

use crate::store::{existing_keys, Collection, DocumentStore};
use super::commands::OrderCommand;
use super::errors::OrderError;
use super::value_objects::{Order, OrderDraft};

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command → Validation → Reference Check → Document Store
//
// ============================================================================

pub struct OrderCommandHandler {
    store: Arc<dyn DocumentStore>,
}

impl OrderCommandHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, command: OrderCommand) -> Result<u64, OrderError> {
        match command {
            OrderCommand::Create(draft) => {
                draft.validate()?;
                self.ensure_references(&draft).await?;
                self.store.insert(Collection::Orders, draft.to_document()).await?;

                tracing::info!(order_id = %draft.order_id, "✅ Order added");
                Ok(1)
            }
            OrderCommand::Update { order_id, draft } => {
                draft.validate()?;
                self.ensure_references(&draft).await?;

                let replaced = self
                    .store
                    .update(Collection::Orders, &order_id, draft.to_document())
                    .await?;
                match replaced {
                    0 => return Err(OrderError::NotFound(order_id)),
                    1 => {}
                    n => tracing::warn!(order_id = %order_id, replaced = n, "Order ID is shared; updated every match"),
                }

                tracing::info!(order_id = %order_id, "Updated order");
                Ok(replaced)
            }
            OrderCommand::Delete { order_id } => {
                let removed = self.store.delete(Collection::Orders, &order_id).await?;
                match removed {
                    0 => return Err(OrderError::NotFound(order_id)),
                    1 => {}
                    n => tracing::warn!(order_id = %order_id, removed = n, "Order ID is shared; deleted every match"),
                }

                tracing::info!(order_id = %order_id, "Deleted order");
                Ok(removed)
            }
        }
    }

    /// Every readable order, plus the number of documents without a OrderID
    pub async fn all(&self) -> Result<(Vec<Order>, usize), OrderError> {
        let documents = self.store.find_all(Collection::Orders).await?;
        let mut orders = Vec::with_capacity(documents.len());
        let mut unreadable = 0;
        for document in &documents {
            match Order::from_document(document) {
                Ok(order) => orders.push(order),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unreadable order document");
                    unreadable += 1;
                }
            }
        }
        Ok((orders, unreadable))
    }

    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Order>, OrderError> {
        let (orders, _) = self.all().await?;
        Ok(orders
            .into_iter()
            .filter(|o| search.map_or(true, |s| o.matches_search(s)))
            .collect())
    }

    /// Every order carrying `order_id`
    pub async fn get(&self, order_id: &str) -> Result<Vec<Order>, OrderError> {
        let orders: Vec<Order> = self
            .store
            .find_by_key(Collection::Orders, order_id)
            .await?
            .iter()
            .filter_map(|d| Order::from_document(d).ok())
            .collect();

        if orders.is_empty() {
            return Err(OrderError::NotFound(order_id.to_string()));
        }
        Ok(orders)
    }

    /// Bulk insert of parsed CSV rows; references are not checked
    pub async fn import(&self, drafts: Vec<OrderDraft>) -> Result<usize, OrderError> {
        for draft in &drafts {
            draft.validate()?;
        }
        let documents = drafts.iter().map(OrderDraft::to_document).collect();
        let inserted = self.store.insert_many(Collection::Orders, documents).await?;

        tracing::info!(count = inserted, "✅ Bulk orders uploaded");
        Ok(inserted)
    }

    async fn ensure_references(&self, draft: &OrderDraft) -> Result<(), OrderError> {
        let products = existing_keys(self.store.as_ref(), Collection::Products).await?;
        if !products.contains(&draft.product_id) {
            return Err(OrderError::UnknownProduct(draft.product_id.clone()));
        }

        let vendors = existing_keys(self.store.as_ref(), Collection::Vendors).await?;
        if !vendors.contains(&draft.vendor_id) {
            return Err(OrderError::UnknownVendor(draft.vendor_id.clone()));
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
