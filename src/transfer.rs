// ============================================================================
// CSV Transfer - Export and Bulk Upload
// ============================================================================
//
// Uploads are all-or-nothing: every row is parsed and validated first, and
// a single bad row rejects the file with a per-line error list. Exports
// write blank cells for fields a stored record could not supply.
//
// ============================================================================

use csv::StringRecord;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::Read;

use crate::domain::order::{parse_order_date, Order, OrderDraft, OrderStatus};
use crate::domain::product::{Product, ProductDraft};
use crate::domain::vendor::{Vendor, VendorDraft};

/// A row-level problem found while reading an upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub line: u64,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("{} invalid row(s), first at line {}: {}", .0.len(), .0[0].line, .0[0].message)]
    InvalidRows(Vec<RowError>),

    #[error("CSV output was not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Serialize)]
struct ProductRow<'a> {
    #[serde(rename = "ProductID")]
    product_id: &'a str,
    #[serde(rename = "Name")]
    name: Option<&'a str>,
    #[serde(rename = "Category")]
    category: Option<&'a str>,
    #[serde(rename = "Stock")]
    stock: Option<u64>,
    #[serde(rename = "Price")]
    price: Option<f64>,
    #[serde(rename = "ReorderLevel")]
    reorder_level: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct VendorRow {
    #[serde(rename = "VendorID")]
    vendor_id: String,
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "ContactInfo", default)]
    contact_info: Option<String>,
    /// Comma separated product ids
    #[serde(rename = "ProductSupplied", default)]
    product_supplied: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OrderRow {
    #[serde(rename = "OrderID")]
    order_id: String,
    #[serde(rename = "ProductID", default)]
    product_id: Option<String>,
    #[serde(rename = "VendorID", default)]
    vendor_id: Option<String>,
    #[serde(rename = "Quantity", default)]
    quantity: Option<u64>,
    #[serde(rename = "OrderDate", default)]
    order_date: Option<String>,
    #[serde(rename = "Status", default)]
    status: Option<String>,
}

// ============================================================================
// Export
// ============================================================================

fn write_rows<T: Serialize>(rows: impl IntoIterator<Item = T>) -> Result<String, TransferError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn export_products(products: &[Product]) -> Result<String, TransferError> {
    if products.is_empty() {
        return Ok("ProductID,Name,Category,Stock,Price,ReorderLevel\n".to_string());
    }
    write_rows(products.iter().map(|p| ProductRow {
        product_id: &p.product_id,
        name: p.name.as_deref(),
        category: p.category.as_deref(),
        stock: p.stock,
        price: p.price,
        reorder_level: p.reorder_level,
    }))
}

pub fn export_vendors(vendors: &[Vendor]) -> Result<String, TransferError> {
    if vendors.is_empty() {
        return Ok("VendorID,Name,ContactInfo,ProductSupplied\n".to_string());
    }
    write_rows(vendors.iter().map(|v| VendorRow {
        vendor_id: v.vendor_id.clone(),
        name: v.name.clone(),
        contact_info: v.contact_info.clone(),
        product_supplied: Some(v.product_supplied.join(", ")),
    }))
}

pub fn export_orders(orders: &[Order]) -> Result<String, TransferError> {
    if orders.is_empty() {
        return Ok("OrderID,ProductID,VendorID,Quantity,OrderDate,Status\n".to_string());
    }
    write_rows(orders.iter().map(|o| OrderRow {
        order_id: o.order_id.clone(),
        product_id: o.product_id.clone(),
        vendor_id: o.vendor_id.clone(),
        quantity: o.quantity,
        order_date: o.order_date.map(|d| d.format("%Y-%m-%d").to_string()),
        status: o.status.as_ref().map(|s| s.as_str().to_string()),
    }))
}

// ============================================================================
// Import
// ============================================================================

/// Deserialize every record, convert it, and collect row errors instead of
/// stopping at the first one.
fn read_rows<R, T, D>(reader: R, convert: impl Fn(T) -> Result<D, String>) -> Result<Vec<D>, TransferError>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut drafts = Vec::new();
    let mut errors = Vec::new();
    let mut record = StringRecord::new();

    while csv_reader.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let parsed = record
            .deserialize::<T>(Some(&headers))
            .map_err(|e| e.to_string())
            .and_then(&convert);

        match parsed {
            Ok(draft) => drafts.push(draft),
            Err(message) => errors.push(RowError { line, message }),
        }
    }

    if !errors.is_empty() {
        tracing::warn!(invalid_rows = errors.len(), "Rejecting CSV upload");
        return Err(TransferError::InvalidRows(errors));
    }
    Ok(drafts)
}

pub fn import_products<R: Read>(reader: R) -> Result<Vec<ProductDraft>, TransferError> {
    read_rows(reader, |draft: ProductDraft| {
        draft.validate().map_err(|e| e.to_string())?;
        Ok(draft)
    })
}

pub fn import_vendors<R: Read>(reader: R) -> Result<Vec<VendorDraft>, TransferError> {
    read_rows(reader, |row: VendorRow| {
        let draft = VendorDraft {
            vendor_id: row.vendor_id,
            name: row.name.unwrap_or_default(),
            contact_info: row.contact_info,
            product_supplied: row
                .product_supplied
                .map(|s| {
                    s.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        };
        draft.validate().map_err(|e| e.to_string())?;
        Ok(draft)
    })
}

pub fn import_orders<R: Read>(reader: R) -> Result<Vec<OrderDraft>, TransferError> {
    read_rows(reader, |row: OrderRow| {
        let raw_date = row.order_date.ok_or("OrderDate is missing")?;
        let order_date = parse_order_date(&raw_date).ok_or_else(|| format!("Unparsable OrderDate: {}", raw_date))?;
        let status = row.status.map(OrderStatus::from).ok_or("Status is missing")?;

        let draft = OrderDraft {
            order_id: row.order_id,
            product_id: row.product_id.ok_or("ProductID is missing")?,
            vendor_id: row.vendor_id.ok_or("VendorID is missing")?,
            quantity: row.quantity.ok_or("Quantity is missing")?,
            order_date,
            status,
        };
        draft.validate().map_err(|e| e.to_string())?;
        Ok(draft)
    })
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_import_products() {
        let csv = "ProductID,Name,Category,Stock,Price,ReorderLevel\n\
                   P1,Widget,Tools,5,2.5,10\n\
                   P2,Gadget,,20,1,3\n";

        let drafts = import_products(csv.as_bytes()).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].category.as_deref(), Some("Tools"));
        assert_eq!(drafts[1].category, None);
        assert_eq!(drafts[1].stock, 20);
    }

    #[test]
    fn test_import_rejects_whole_file_on_bad_row() {
        let csv = "ProductID,Name,Category,Stock,Price,ReorderLevel\n\
                   P1,Widget,Tools,5,2.5,10\n\
                   P2,Gadget,Tools,-4,1,3\n\
                   P3,,Tools,1,1,1\n";

        match import_products(csv.as_bytes()) {
            Err(TransferError::InvalidRows(errors)) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].line, 3);
                assert_eq!(errors[1].line, 4);
                assert!(errors[1].message.contains("name"));
            }
            other => panic!("expected row errors, got {:?}", other),
        }
    }

    #[test]
    fn test_import_vendors_splits_product_list() {
        let csv = "VendorID,Name,ContactInfo,ProductSupplied\n\
                   V1,Acme,sales@acme.test,\"P1, P2 ,P3\"\n\
                   V2,Solo,,P9\n";

        let drafts = import_vendors(csv.as_bytes()).unwrap();
        assert_eq!(drafts[0].product_supplied, vec!["P1", "P2", "P3"]);
        assert_eq!(drafts[1].product_supplied, vec!["P9"]);
        assert_eq!(drafts[1].contact_info, None);
    }

    #[test]
    fn test_import_orders_accepts_legacy_dates() {
        let csv = "OrderID,ProductID,VendorID,Quantity,OrderDate,Status\n\
                   O1,P1,V1,3,2024-01-05,Pending\n\
                   O2,P1,V1,1,02/10/2024,Completed\n";

        let drafts = import_orders(csv.as_bytes()).unwrap();
        assert_eq!(drafts[1].order_date, NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
        assert_eq!(drafts[1].status, OrderStatus::Completed);
    }

    #[test]
    fn test_import_orders_rejects_bad_date_and_status() {
        let csv = "OrderID,ProductID,VendorID,Quantity,OrderDate,Status\n\
                   O1,P1,V1,3,someday,Pending\n\
                   O2,P1,V1,1,2024-01-01,Lost\n";

        let Err(TransferError::InvalidRows(errors)) = import_orders(csv.as_bytes()) else {
            panic!("expected row errors");
        };
        assert!(errors[0].message.contains("someday"));
        assert!(errors[1].message.contains("Lost"));
    }

    #[test]
    fn test_import_orders_names_missing_cells() {
        let csv = "OrderID,ProductID,VendorID,Quantity,OrderDate,Status\n\
                   O1,P1,,3,2024-01-05,Pending\n\
                   O2,P1,V1,,2024-01-05,Pending\n";

        let Err(TransferError::InvalidRows(errors)) = import_orders(csv.as_bytes()) else {
            panic!("expected row errors");
        };
        assert_eq!(errors[0].message, "VendorID is missing");
        assert_eq!(errors[1].message, "Quantity is missing");
    }

    #[test]
    fn test_export_products() {
        let products = vec![Product {
            product_id: "P1".to_string(),
            name: Some("Widget".to_string()),
            category: None,
            stock: Some(5),
            price: Some(2.5),
            reorder_level: Some(10),
        }];

        let csv = export_products(&products).unwrap();
        assert_eq!(csv, "ProductID,Name,Category,Stock,Price,ReorderLevel\nP1,Widget,,5,2.5,10\n");
    }

    #[test]
    fn test_export_keeps_incomplete_products() {
        let products = vec![Product {
            product_id: "P2".to_string(),
            name: None,
            category: None,
            stock: None,
            price: None,
            reorder_level: Some(3),
        }];

        let csv = export_products(&products).unwrap();
        assert!(csv.ends_with("P2,,,,,3\n"));
    }

    #[test]
    fn test_export_vendors_joins_products() {
        let vendors = vec![Vendor {
            vendor_id: "V1".to_string(),
            name: Some("Acme".to_string()),
            contact_info: Some("x@y.z".to_string()),
            product_supplied: vec!["P1".to_string(), "P2".to_string()],
        }];

        let csv = export_vendors(&vendors).unwrap();
        assert!(csv.ends_with("V1,Acme,x@y.z,\"P1, P2\"\n"));
    }

    #[test]
    fn test_export_orders_leaves_unknown_date_blank() {
        let orders = vec![Order {
            order_id: "O1".to_string(),
            product_id: Some("P1".to_string()),
            vendor_id: Some("V1".to_string()),
            quantity: Some(2),
            order_date: None,
            status: Some(OrderStatus::Other("Shipped".to_string())),
        }];

        let csv = export_orders(&orders).unwrap();
        assert!(csv.ends_with("O1,P1,V1,2,,Shipped\n"));
        assert!(export_orders(&[]).unwrap().starts_with("OrderID,"));
    }
}
