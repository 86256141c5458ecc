use anyhow::Context;

use crate::domain::order::Order;
use crate::domain::product::Product;
use crate::domain::vendor::Vendor;
use crate::domain::{Normalized, RecordError};
use crate::store::{Collection, Document, DocumentStore};
use super::report::SkippedRecords;

// ============================================================================
// Snapshot - Normalized view of the three collections
// ============================================================================
//
// Three sequential full reads, not transactional: a concurrent write between
// them may make cross-metric numbers momentarily disagree.
//
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub products: Vec<Product>,
    pub vendors: Vec<Vendor>,
    pub orders: Vec<Order>,
    pub skipped: SkippedRecords,
}

impl Snapshot {
    pub async fn load(store: &dyn DocumentStore) -> anyhow::Result<Self> {
        let products = store
            .find_all(Collection::Products)
            .await
            .with_context(|| format!("failed to read {} snapshot", Collection::Products))?;
        let vendors = store
            .find_all(Collection::Vendors)
            .await
            .with_context(|| format!("failed to read {} snapshot", Collection::Vendors))?;
        let orders = store
            .find_all(Collection::Orders)
            .await
            .with_context(|| format!("failed to read {} snapshot", Collection::Orders))?;

        Ok(Self::from_documents(&products, &vendors, &orders))
    }

    pub fn from_documents(products: &[Document], vendors: &[Document], orders: &[Document]) -> Self {
        let products = normalize(Collection::Products, products, Product::normalize);
        let vendors = normalize(Collection::Vendors, vendors, Vendor::normalize);
        let orders = normalize(Collection::Orders, orders, Order::normalize);
        let undated_orders = orders.records.iter().filter(|o| o.order_date.is_none()).count();

        Self {
            skipped: SkippedRecords {
                products: products.skipped,
                vendors: vendors.skipped,
                orders: orders.skipped,
                incomplete_products: products.incomplete,
                incomplete_vendors: vendors.incomplete,
                incomplete_orders: orders.incomplete,
                undated_orders,
            },
            products: products.records,
            vendors: vendors.records,
            orders: orders.records,
        }
    }
}

struct Collected<T> {
    records: Vec<T>,
    skipped: usize,
    incomplete: usize,
}

fn normalize<T>(
    collection: Collection,
    documents: &[Document],
    parse: impl Fn(&Document) -> Result<Normalized<T>, RecordError>,
) -> Collected<T> {
    let mut collected = Collected {
        records: Vec::with_capacity(documents.len()),
        skipped: 0,
        incomplete: 0,
    };

    for document in documents {
        match parse(document) {
            Ok(normalized) => {
                if !normalized.is_complete() {
                    collected.incomplete += 1;
                    let issues: Vec<String> = normalized.issues.iter().map(ToString::to_string).collect();
                    tracing::debug!(
                        collection = %collection,
                        key = ?collection.key_of(document),
                        issues = ?issues,
                        "Keeping record with unusable fields"
                    );
                }
                collected.records.push(normalized.record);
            }
            Err(e) => {
                collected.skipped += 1;
                tracing::warn!(
                    collection = %collection,
                    error = %e,
                    "Skipping record without a key"
                );
            }
        }
    }

    collected
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryDocumentStore;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_invalid_fields_are_counted_not_fatal() {
        let products = vec![
            doc(json!({"ProductID": "P1", "Name": "A", "Stock": 1, "ReorderLevel": 2})),
            doc(json!({"ProductID": "P2", "Name": "B", "Stock": "lots", "ReorderLevel": 2})),
        ];
        let vendors = vec![doc(json!({"Name": "no id"}))];
        let orders = vec![
            doc(json!({"OrderID": "O1", "ProductID": "P1", "VendorID": "V1", "Quantity": 1, "OrderDate": "2024-01-01"})),
            doc(json!({"OrderID": "O2", "ProductID": "P1", "VendorID": "V1", "Quantity": 1, "OrderDate": "soon"})),
        ];

        let snapshot = Snapshot::from_documents(&products, &vendors, &orders);

        assert_eq!(snapshot.products.len(), 2);
        assert_eq!(snapshot.products[1].stock, None);
        assert_eq!(snapshot.vendors.len(), 0);
        assert_eq!(snapshot.orders.len(), 2);
        assert_eq!(
            snapshot.skipped,
            SkippedRecords {
                products: 0,
                vendors: 1,
                orders: 0,
                incomplete_products: 1,
                incomplete_vendors: 0,
                incomplete_orders: 0,
                undated_orders: 1,
            }
        );
    }

    #[test]
    fn test_only_missing_keys_drop_records() {
        let products = vec![
            doc(json!({"ProductID": "P1", "Price": "n/a"})),
            doc(json!({"Name": "no id", "Stock": 4, "ReorderLevel": 1})),
        ];
        let vendors = vec![doc(json!({"VendorID": "V1"})), doc(json!({"VendorID": null, "Name": "Acme"}))];
        let orders = vec![doc(json!({"OrderID": "O1"})), doc(json!({"ProductID": "P1", "Quantity": 2}))];

        let snapshot = Snapshot::from_documents(&products, &vendors, &orders);

        assert_eq!(snapshot.products.len(), 1);
        assert_eq!(snapshot.vendors.len(), 1);
        assert_eq!(snapshot.orders.len(), 1);
        assert_eq!(snapshot.skipped.total_invalid(), 3);
        assert_eq!(snapshot.skipped.total_incomplete(), 3);
    }

    #[tokio::test]
    async fn test_load_from_store() {
        let store = InMemoryDocumentStore::new();
        store
            .insert(Collection::Vendors, doc(json!({"VendorID": "V1", "Name": "Acme", "ProductSupplied": "P1"})))
            .await
            .unwrap();

        let snapshot = Snapshot::load(&store).await.unwrap();
        assert!(snapshot.products.is_empty());
        assert_eq!(snapshot.vendors[0].product_supplied, vec!["P1"]);
    }
}
