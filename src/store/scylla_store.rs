use anyhow::Result;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use std::sync::Arc;
use uuid::Uuid;

use super::{Collection, Document, DocumentStore};

// ============================================================================
// ScyllaDB Document Store
// ============================================================================
//
// All three collections share one table, partitioned by collection name:
//
//   documents (collection text, id uuid, business_key text, body text,
//              PRIMARY KEY (collection, id))
//
// Row ids are UUIDv7, so clustering order is insertion order and a
// partition scan yields the collection snapshot in the order it was written.
// Bodies are stored as JSON text; the store never interprets their fields
// beyond the business key.
//
// ============================================================================

pub struct ScyllaDocumentStore {
    session: Arc<Session>,
}

impl ScyllaDocumentStore {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Open the process-wide session and make sure the schema exists
    pub async fn connect(nodes: &[String], keyspace: &str) -> Result<Self> {
        tracing::info!(nodes = ?nodes, keyspace = %keyspace, "Connecting to ScyllaDB...");

        let session: Session = SessionBuilder::new().known_nodes(nodes).build().await?;

        session
            .query_unpaged(
                format!(
                    "CREATE KEYSPACE IF NOT EXISTS {} WITH REPLICATION = \
                     {{'class': 'SimpleStrategy', 'replication_factor': 1}}",
                    keyspace
                ),
                &[],
            )
            .await?;

        session.use_keyspace(keyspace, false).await?;

        session
            .query_unpaged(
                "CREATE TABLE IF NOT EXISTS documents (
                    collection text,
                    id uuid,
                    business_key text,
                    body text,
                    PRIMARY KEY (collection, id)
                )",
                &[],
            )
            .await?;

        tracing::info!("✅ Document store schema ready");
        Ok(Self::new(Arc::new(session)))
    }

    async fn scan(&self, collection: Collection) -> Result<Vec<(Uuid, Option<String>, String)>> {
        let rows = self
            .session
            .query_iter(
                "SELECT id, business_key, body FROM documents WHERE collection = ?",
                (collection.name(),),
            )
            .await?
            .rows_stream::<(Uuid, Option<String>, String)>()?
            .try_collect::<Vec<_>>()
            .await?;
        Ok(rows)
    }

    async fn ids_for_key(&self, collection: Collection, key: &str) -> Result<Vec<Uuid>> {
        Ok(self
            .scan(collection)
            .await?
            .into_iter()
            .filter(|(_, business_key, _)| business_key.as_deref() == Some(key))
            .map(|(id, _, _)| id)
            .collect())
    }

    async fn write(&self, collection: Collection, id: Uuid, document: &Document) -> Result<()> {
        let body = serde_json::to_string(document)?;
        self.session
            .query_unpaged(
                "INSERT INTO documents (collection, id, business_key, body) VALUES (?, ?, ?, ?)",
                (collection.name(), id, collection.key_of(document), body),
            )
            .await?;
        Ok(())
    }
}

fn parse_body(collection: Collection, id: Uuid, body: &str) -> Option<Document> {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(document)) => Some(document),
        Ok(_) | Err(_) => {
            tracing::warn!(
                collection = %collection,
                id = %id,
                "Skipping stored body that is not a JSON object"
            );
            None
        }
    }
}

#[async_trait]
impl DocumentStore for ScyllaDocumentStore {
    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>> {
        let rows = self.scan(collection).await?;
        let documents: Vec<Document> = rows
            .iter()
            .filter_map(|(id, _, body)| parse_body(collection, *id, body))
            .collect();

        tracing::debug!(collection = %collection, count = documents.len(), "Loaded collection");
        Ok(documents)
    }

    async fn find_by_key(&self, collection: Collection, key: &str) -> Result<Vec<Document>> {
        Ok(self
            .scan(collection)
            .await?
            .iter()
            .filter(|(_, business_key, _)| business_key.as_deref() == Some(key))
            .filter_map(|(id, _, body)| parse_body(collection, *id, body))
            .collect())
    }

    async fn insert(&self, collection: Collection, document: Document) -> Result<()> {
        self.write(collection, Uuid::now_v7(), &document).await
    }

    async fn insert_many(&self, collection: Collection, documents: Vec<Document>) -> Result<usize> {
        for document in &documents {
            self.write(collection, Uuid::now_v7(), document).await?;
        }

        tracing::info!(collection = %collection, count = documents.len(), "✅ Inserted documents");
        Ok(documents.len())
    }

    async fn update(&self, collection: Collection, key: &str, document: Document) -> Result<u64> {
        let ids = self.ids_for_key(collection, key).await?;
        for id in &ids {
            // Same row id keeps the document's original position
            self.write(collection, *id, &document).await?;
        }
        Ok(ids.len() as u64)
    }

    async fn delete(&self, collection: Collection, key: &str) -> Result<u64> {
        let ids = self.ids_for_key(collection, key).await?;
        for id in &ids {
            self.session
                .query_unpaged(
                    "DELETE FROM documents WHERE collection = ? AND id = ?",
                    (collection.name(), *id),
                )
                .await?;
        }
        Ok(ids.len() as u64)
    }

    async fn delete_all(&self, collection: Collection) -> Result<u64> {
        let count = self.scan(collection).await?.len() as u64;
        self.session
            .query_unpaged("DELETE FROM documents WHERE collection = ?", (collection.name(),))
            .await?;
        Ok(count)
    }

    async fn ping(&self) -> Result<()> {
        self.session
            .query_unpaged("SELECT now() FROM system.local", &[])
            .await?;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_body_accepts_objects_only() {
        let id = Uuid::now_v7();
        let parsed = parse_body(Collection::Products, id, r#"{"ProductID":"P1","Stock":4}"#).unwrap();
        assert_eq!(parsed.get("Stock"), Some(&json!(4)));

        assert!(parse_body(Collection::Products, id, "[1,2,3]").is_none());
        assert!(parse_body(Collection::Products, id, "not json").is_none());
    }

    #[test]
    fn test_v7_ids_sort_by_creation() {
        let first = Uuid::now_v7();
        let second = Uuid::now_v7();
        assert!(first < second);
    }

    // Round trips against a live cluster are exercised by running the
    // service with `--store scylla`.
}
