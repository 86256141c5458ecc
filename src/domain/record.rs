use serde_json::Value;

use crate::store::{scalar_to_string, Document};

// ============================================================================
// Field Access for Schema-less Documents
// ============================================================================
//
// Raw documents come from forms, CSV uploads and legacy edits, so field
// shapes drift. These helpers turn a field into its canonical Rust type or
// report exactly which field was unusable. Only a missing key makes a
// record unusable; every other unusable field is blanked and reported.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// A cleaned record plus the fields that had to be blanked on the way
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub record: T,
    pub issues: Vec<RecordError>,
}

impl<T> Normalized<T> {
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }
}

fn present<'a>(document: &'a Document, field: &'static str) -> Option<&'a Value> {
    document.get(field).filter(|v| !v.is_null())
}

fn invalid(field: &'static str, value: &Value) -> RecordError {
    RecordError::InvalidField {
        field,
        value: value.to_string(),
    }
}

pub fn required_string(document: &Document, field: &'static str) -> Result<String, RecordError> {
    let value = present(document, field).ok_or(RecordError::MissingField(field))?;
    scalar_to_string(value).ok_or_else(|| invalid(field, value))
}

/// Absent, null and non-scalar values all read as `None`
pub fn optional_string(document: &Document, field: &'static str) -> Option<String> {
    present(document, field).and_then(scalar_to_string)
}

/// Non-negative integer that fits a `u64`; accepts integral floats and
/// numeric strings
pub fn required_count(document: &Document, field: &'static str) -> Result<u64, RecordError> {
    let value = present(document, field).ok_or(RecordError::MissingField(field))?;
    let count = match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(integral_count)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral_count))
        }
        _ => None,
    };
    count.ok_or_else(|| invalid(field, value))
}

// 2^64 is the first float past u64::MAX; `as` would saturate there
fn integral_count(n: f64) -> Option<u64> {
    (n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n < u64::MAX as f64).then(|| n as u64)
}

pub fn optional_number(document: &Document, field: &'static str) -> Result<Option<f64>, RecordError> {
    let Some(value) = present(document, field) else {
        return Ok(None);
    };
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(invalid(field, value)),
    }
}

/// Reads one document field by field, collecting every unusable field
/// instead of stopping at the first one
pub struct FieldReader<'a> {
    document: &'a Document,
    issues: Vec<RecordError>,
}

impl<'a> FieldReader<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            issues: Vec::new(),
        }
    }

    /// The record key; the only field whose absence rejects the record
    pub fn key(&self, field: &'static str) -> Result<String, RecordError> {
        required_string(self.document, field)
    }

    pub fn string(&mut self, field: &'static str) -> Option<String> {
        self.keep(required_string(self.document, field))
    }

    pub fn optional_string(&self, field: &'static str) -> Option<String> {
        optional_string(self.document, field)
    }

    pub fn count(&mut self, field: &'static str) -> Option<u64> {
        self.keep(required_count(self.document, field))
    }

    pub fn optional_number(&mut self, field: &'static str) -> Option<f64> {
        self.keep(optional_number(self.document, field)).flatten()
    }

    pub fn raw(&self, field: &str) -> Option<&'a Value> {
        self.document.get(field)
    }

    pub fn finish<T>(self, record: T) -> Normalized<T> {
        Normalized {
            record,
            issues: self.issues,
        }
    }

    fn keep<T>(&mut self, result: Result<T, RecordError>) -> Option<T> {
        result.map_err(|e| self.issues.push(e)).ok()
    }
}
