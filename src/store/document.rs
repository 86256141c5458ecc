use serde_json::{Map, Value};

// ============================================================================
// Documents and Collections
// ============================================================================
//
// Records are schema-less JSON objects. Each collection is keyed by a
// business identifier field whose uniqueness is NOT enforced.
//
// ============================================================================

pub type Document = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Products,
    Vendors,
    Orders,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Products, Collection::Vendors, Collection::Orders];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Vendors => "vendors",
            Collection::Orders => "orders",
        }
    }

    /// Field holding the business identifier
    pub fn key_field(&self) -> &'static str {
        match self {
            Collection::Products => "ProductID",
            Collection::Vendors => "VendorID",
            Collection::Orders => "OrderID",
        }
    }

    /// Extract the business key of a document, coercing numeric ids to strings
    pub fn key_of(&self, document: &Document) -> Option<String> {
        document.get(self.key_field()).and_then(scalar_to_string)
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Strings pass through; numbers are rendered without a trailing `.0`
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.fract() == 0.0 && f.is_finite() {
                        format!("{}", f as i64)
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        _ => None,
    }
}
