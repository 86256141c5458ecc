// ============================================================================
// Document Store - Persistence Boundary
// ============================================================================
//
// Three schema-less collections (products, vendors, orders) behind one
// trait. A single store handle is opened at startup and injected wherever
// it is needed.
//
// Backends:
// - ScyllaDocumentStore: JSON documents in a ScyllaDB table
// - InMemoryDocumentStore: process-local, used for development and tests
//
// ============================================================================

mod document;
mod memory;
mod scylla_store;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;

pub use document::{scalar_to_string, Collection, Document};
pub use memory::InMemoryDocumentStore;
pub use scylla_store::ScyllaDocumentStore;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Full snapshot of a collection, in insertion order
    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>>;

    /// Every document carrying the given business key
    async fn find_by_key(&self, collection: Collection, key: &str) -> Result<Vec<Document>>;

    async fn insert(&self, collection: Collection, document: Document) -> Result<()>;

    async fn insert_many(&self, collection: Collection, documents: Vec<Document>) -> Result<usize>;

    /// Replace every document carrying `key`; returns the number replaced
    async fn update(&self, collection: Collection, key: &str, document: Document) -> Result<u64>;

    /// Remove every document carrying `key`; returns the number removed
    async fn delete(&self, collection: Collection, key: &str) -> Result<u64>;

    async fn delete_all(&self, collection: Collection) -> Result<u64>;

    /// Cheap liveness check used by the health monitor
    async fn ping(&self) -> Result<()>;
}

/// Business keys currently present in a collection
pub async fn existing_keys(store: &dyn DocumentStore, collection: Collection) -> Result<HashSet<String>> {
    Ok(store
        .find_all(collection)
        .await?
        .iter()
        .filter_map(|d| collection.key_of(d))
        .collect())
}
