use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::record::{FieldReader, Normalized, RecordError};
use crate::store::Document;
use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Order status; values written by older tools are kept verbatim
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    Completed,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Completed => "Completed",
            OrderStatus::Other(value) => value,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Pending" => OrderStatus::Pending,
            "Completed" => OrderStatus::Completed,
            _ => OrderStatus::Other(value),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Parse an order date as written by the forms (`YYYY-MM-DD`), by legacy
/// edits (`MM/DD/YYYY`) or by bulk imports carrying a full timestamp.
pub fn parse_order_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
                .ok()
                .map(|dt| dt.date())
        })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "OrderID")]
    pub order_id: String,
    #[serde(rename = "ProductID")]
    pub product_id: Option<String>,
    #[serde(rename = "VendorID")]
    pub vendor_id: Option<String>,
    #[serde(rename = "Quantity")]
    pub quantity: Option<u64>,
    /// `None` when the stored date is absent or unparsable
    #[serde(rename = "OrderDate")]
    pub order_date: Option<NaiveDate>,
    #[serde(rename = "Status")]
    pub status: Option<OrderStatus>,
}

impl Order {
    /// Fails only when OrderID is missing. An unparsable date is not an
    /// issue here; the snapshot counts undated orders on its own.
    pub fn normalize(document: &Document) -> Result<Normalized<Self>, RecordError> {
        let mut reader = FieldReader::new(document);
        let order = Self {
            order_id: reader.key("OrderID")?,
            product_id: reader.string("ProductID"),
            vendor_id: reader.string("VendorID"),
            quantity: reader.count("Quantity"),
            order_date: reader.optional_string("OrderDate").and_then(|d| parse_order_date(&d)),
            status: reader.optional_string("Status").map(OrderStatus::from),
        };
        Ok(reader.finish(order))
    }

    pub fn from_document(document: &Document) -> Result<Self, RecordError> {
        Self::normalize(document).map(|n| n.record)
    }

    pub fn matches_search(&self, needle: &str) -> bool {
        self.order_id.to_lowercase().contains(&needle.to_lowercase())
    }
}

/// Order form / CSV row before it is written to the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    #[serde(rename = "OrderID")]
    pub order_id: String,
    #[serde(rename = "ProductID")]
    pub product_id: String,
    #[serde(rename = "VendorID")]
    pub vendor_id: String,
    #[serde(rename = "Quantity")]
    pub quantity: u64,
    #[serde(rename = "OrderDate")]
    pub order_date: NaiveDate,
    #[serde(rename = "Status")]
    pub status: OrderStatus,
}

impl OrderDraft {
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.order_id.trim().is_empty() {
            return Err(OrderError::EmptyOrderId);
        }
        if self.quantity == 0 {
            return Err(OrderError::InvalidQuantity(self.quantity));
        }
        if let OrderStatus::Other(value) = &self.status {
            return Err(OrderError::InvalidStatus(value.clone()));
        }
        Ok(())
    }

    /// Canonical shape: ISO date string, literal status
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        document.insert("OrderID".into(), json!(self.order_id.trim()));
        document.insert("ProductID".into(), json!(self.product_id));
        document.insert("VendorID".into(), json!(self.vendor_id));
        document.insert("Quantity".into(), json!(self.quantity));
        document.insert("OrderDate".into(), json!(self.order_date.format("%Y-%m-%d").to_string()));
        document.insert("Status".into(), json!(self.status.as_str()));
        document
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
