use std::sync::Arc;

use crate::store::{Collection, DocumentStore};
use super::commands::ProductCommand;
use super::errors::ProductError;
use super::value_objects::{Product, ProductDraft};

// ============================================================================
// Product Command Handler
// ============================================================================
//
// Orchestrates: Command → Validation → Document Store
//
// ============================================================================

pub struct ProductCommandHandler {
    store: Arc<dyn DocumentStore>,
}

impl ProductCommandHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Handle a command; returns the number of documents written or removed
    pub async fn handle(&self, command: ProductCommand) -> Result<u64, ProductError> {
        match command {
            ProductCommand::Create(draft) => {
                draft.validate()?;
                self.ensure_absent(draft.product_id.trim()).await?;
                self.store.insert(Collection::Products, draft.to_document()).await?;

                tracing::info!(product_id = %draft.product_id, "✅ Product added");
                Ok(1)
            }
            ProductCommand::Update { product_id, draft } => {
                draft.validate()?;
                // Stored keys are trimmed, so a whitespace-only change is no rename
                if draft.product_id.trim() != product_id.trim() {
                    self.ensure_absent(draft.product_id.trim()).await?;
                }

                let replaced = self
                    .store
                    .update(Collection::Products, &product_id, draft.to_document())
                    .await?;
                if replaced == 0 {
                    return Err(ProductError::NotFound(product_id));
                }

                tracing::info!(product_id = %product_id, replaced, "Updated product");
                Ok(replaced)
            }
            ProductCommand::Delete { product_id } => {
                let removed = self.store.delete(Collection::Products, &product_id).await?;
                if removed == 0 {
                    return Err(ProductError::NotFound(product_id));
                }

                tracing::info!(product_id = %product_id, removed, "Deleted product");
                Ok(removed)
            }
        }
    }

    /// Every readable product, plus the number of documents without a ProductID
    pub async fn all(&self) -> Result<(Vec<Product>, usize), ProductError> {
        let documents = self.store.find_all(Collection::Products).await?;
        let mut products = Vec::with_capacity(documents.len());
        let mut unreadable = 0;
        for document in &documents {
            match Product::from_document(document) {
                Ok(product) => products.push(product),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unreadable product document");
                    unreadable += 1;
                }
            }
        }
        Ok((products, unreadable))
    }

    /// Current products, optionally filtered by ID or name
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Product>, ProductError> {
        let (products, _) = self.all().await?;
        Ok(products
            .into_iter()
            .filter(|p| search.map_or(true, |s| p.matches_search(s)))
            .collect())
    }

    pub async fn get(&self, product_id: &str) -> Result<Product, ProductError> {
        let documents = self.store.find_by_key(Collection::Products, product_id).await?;
        documents
            .iter()
            .find_map(|d| Product::from_document(d).ok())
            .ok_or_else(|| ProductError::NotFound(product_id.to_string()))
    }

    /// Bulk insert of already parsed rows (CSV upload)
    pub async fn import(&self, drafts: Vec<ProductDraft>) -> Result<usize, ProductError> {
        for draft in &drafts {
            draft.validate()?;
        }
        let documents = drafts.iter().map(ProductDraft::to_document).collect();
        let inserted = self.store.insert_many(Collection::Products, documents).await?;

        tracing::info!(count = inserted, "✅ Bulk products uploaded");
        Ok(inserted)
    }

    async fn ensure_absent(&self, product_id: &str) -> Result<(), ProductError> {
        if self.store.find_by_key(Collection::Products, product_id).await?.is_empty() {
            Ok(())
        } else {
            Err(ProductError::AlreadyExists(product_id.to_string()))
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryDocumentStore;
    use serde_json::json;

    fn draft(id: &str, name: &str) -> ProductDraft {
        ProductDraft {
            product_id: id.to_string(),
            name: name.to_string(),
            category: Some("Parts".to_string()),
            stock: 10,
            price: 1.0,
            reorder_level: 5,
        }
    }

    fn handler() -> ProductCommandHandler {
        ProductCommandHandler::new(Arc::new(InMemoryDocumentStore::new()))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let handler = handler();
        handler.handle(ProductCommand::Create(draft("P1", "Widget"))).await.unwrap();

        let product = handler.get("P1").await.unwrap();
        assert_eq!(product.name.as_deref(), Some("Widget"));
    }

    #[tokio::test]
    async fn test_duplicate_product_id_rejected() {
        let handler = handler();
        handler.handle(ProductCommand::Create(draft("P1", "Widget"))).await.unwrap();

        let result = handler.handle(ProductCommand::Create(draft("P1", "Other"))).await;
        assert!(matches!(result, Err(ProductError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_update_can_rename_key() {
        let handler = handler();
        handler.handle(ProductCommand::Create(draft("P1", "Widget"))).await.unwrap();

        handler
            .handle(ProductCommand::Update {
                product_id: "P1".to_string(),
                draft: draft("P9", "Widget v2"),
            })
            .await
            .unwrap();

        assert!(matches!(handler.get("P1").await, Err(ProductError::NotFound(_))));
        assert_eq!(handler.get("P9").await.unwrap().name.as_deref(), Some("Widget v2"));
    }

    #[tokio::test]
    async fn test_padded_key_collides_with_existing() {
        let handler = handler();
        handler.handle(ProductCommand::Create(draft("P1", "Widget"))).await.unwrap();
        handler.handle(ProductCommand::Create(draft("P2", "Gadget"))).await.unwrap();

        let result = handler.handle(ProductCommand::Create(draft(" P1 ", "Copy"))).await;
        assert!(matches!(result, Err(ProductError::AlreadyExists(_))));

        let result = handler
            .handle(ProductCommand::Update {
                product_id: "P2".to_string(),
                draft: draft("P1 ", "Gadget"),
            })
            .await;
        assert!(matches!(result, Err(ProductError::AlreadyExists(_))));
        assert_eq!(handler.list(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_with_padded_own_key() {
        let handler = handler();
        handler.handle(ProductCommand::Create(draft("P1", "Widget"))).await.unwrap();

        handler
            .handle(ProductCommand::Update {
                product_id: "P1".to_string(),
                draft: draft(" P1", "Widget v2"),
            })
            .await
            .unwrap();
        assert_eq!(handler.get("P1").await.unwrap().name.as_deref(), Some("Widget v2"));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let handler = handler();
        let result = handler
            .handle(ProductCommand::Update {
                product_id: "nope".to_string(),
                draft: draft("nope", "x"),
            })
            .await;
        assert!(matches!(result, Err(ProductError::NotFound(_))));

        let result = handler
            .handle(ProductCommand::Delete { product_id: "nope".to_string() })
            .await;
        assert!(matches!(result, Err(ProductError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_with_search() {
        let handler = handler();
        handler.handle(ProductCommand::Create(draft("P1", "Widget"))).await.unwrap();
        handler.handle(ProductCommand::Create(draft("P2", "Gadget"))).await.unwrap();

        assert_eq!(handler.list(None).await.unwrap().len(), 2);

        let found = handler.list(Some("GADG")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].product_id, "P2");
    }

    #[tokio::test]
    async fn test_all_counts_documents_without_key() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store
            .insert(Collection::Products, json!({"ProductID": "P1", "Price": "n/a"}).as_object().cloned().unwrap())
            .await
            .unwrap();
        store
            .insert(Collection::Products, json!({"Name": "orphan"}).as_object().cloned().unwrap())
            .await
            .unwrap();
        let handler = ProductCommandHandler::new(store);

        let (products, unreadable) = handler.all().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price, None);
        assert_eq!(unreadable, 1);
    }

    #[tokio::test]
    async fn test_import_rejects_invalid_batch() {
        let handler = handler();
        let result = handler.import(vec![draft("P1", "ok"), draft("P2", "")]).await;
        assert!(matches!(result, Err(ProductError::EmptyName)));
        assert!(handler.list(None).await.unwrap().is_empty());

        assert_eq!(handler.import(vec![draft("P1", "a"), draft("P2", "b")]).await.unwrap(), 2);
    }
}
