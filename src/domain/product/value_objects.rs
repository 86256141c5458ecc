use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::record::{FieldReader, Normalized, RecordError};
use crate::store::Document;
use super::errors::ProductError;

// ============================================================================
// Product Value Objects
// ============================================================================

/// Canonical product as seen by the reporting engine. Only the ID is
/// guaranteed; the other fields are `None` when absent or unusable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "ProductID")]
    pub product_id: String,
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Category", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "Stock", skip_serializing_if = "Option::is_none")]
    pub stock: Option<u64>,
    #[serde(rename = "Price", skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(rename = "ReorderLevel", skip_serializing_if = "Option::is_none")]
    pub reorder_level: Option<u64>,
}

impl Product {
    /// Fails only when ProductID is missing
    pub fn normalize(document: &Document) -> Result<Normalized<Self>, RecordError> {
        let mut reader = FieldReader::new(document);
        let product = Self {
            product_id: reader.key("ProductID")?,
            name: reader.string("Name"),
            category: reader.optional_string("Category"),
            stock: reader.count("Stock"),
            price: reader.optional_number("Price"),
            reorder_level: reader.count("ReorderLevel"),
        };
        Ok(reader.finish(product))
    }

    pub fn from_document(document: &Document) -> Result<Self, RecordError> {
        Self::normalize(document).map(|n| n.record)
    }

    /// `None` when stock or reorder level is unknown
    pub fn needs_reorder(&self) -> Option<bool> {
        Some(self.stock? <= self.reorder_level?)
    }

    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.product_id.to_lowercase().contains(&needle)
            || self.name.as_deref().is_some_and(|n| n.to_lowercase().contains(&needle))
    }
}

/// Product form / CSV row before it is written to the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(rename = "ProductID")]
    pub product_id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Category", default)]
    pub category: Option<String>,
    #[serde(rename = "Stock")]
    pub stock: u64,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "ReorderLevel")]
    pub reorder_level: u64,
}

impl ProductDraft {
    pub fn validate(&self) -> Result<(), ProductError> {
        if self.product_id.trim().is_empty() {
            return Err(ProductError::EmptyProductId);
        }
        if self.name.trim().is_empty() {
            return Err(ProductError::EmptyName);
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ProductError::InvalidPrice(self.price));
        }
        Ok(())
    }

    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        document.insert("ProductID".into(), json!(self.product_id.trim()));
        document.insert("Name".into(), json!(self.name));
        if let Some(category) = &self.category {
            document.insert("Category".into(), json!(category));
        }
        document.insert("Stock".into(), json!(self.stock));
        document.insert("Price".into(), json!(self.price));
        document.insert("ReorderLevel".into(), json!(self.reorder_level));
        document
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
