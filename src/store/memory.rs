use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{Collection, Document, DocumentStore};

// ============================================================================
// In-Memory Document Store
// ============================================================================

#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn find_by_key(&self, collection: Collection, key: &str) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| collection.key_of(d).as_deref() == Some(key))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, collection: Collection, document: Document) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.entry(collection).or_default().push(document);
        Ok(())
    }

    async fn insert_many(&self, collection: Collection, documents: Vec<Document>) -> Result<usize> {
        let count = documents.len();
        let mut collections = self.collections.write().await;
        collections.entry(collection).or_default().extend(documents);
        Ok(count)
    }

    async fn update(&self, collection: Collection, key: &str, document: Document) -> Result<u64> {
        let mut collections = self.collections.write().await;
        let mut replaced = 0;
        if let Some(docs) = collections.get_mut(&collection) {
            for existing in docs.iter_mut() {
                if collection.key_of(existing).as_deref() == Some(key) {
                    *existing = document.clone();
                    replaced += 1;
                }
            }
        }
        Ok(replaced)
    }

    async fn delete(&self, collection: Collection, key: &str) -> Result<u64> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| collection.key_of(d).as_deref() != Some(key));
        Ok((before - docs.len()) as u64)
    }

    async fn delete_all(&self, collection: Collection) -> Result<u64> {
        let mut collections = self.collections.write().await;
        Ok(collections.remove(&collection).map(|docs| docs.len() as u64).unwrap_or(0))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
