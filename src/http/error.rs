use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::{json, Value};

use crate::domain::order::OrderError;
use crate::domain::product::ProductError;
use crate::domain::vendor::VendorError;
use crate::reporting::ReportError;
use crate::transfer::TransferError;

/// Error body returned by every API route: `{"error": {"code", "message", "details"}}`
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Value,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: Value::Null,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", "Access Denied")
    }

    fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_failed", message)
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "already_exists", message)
    }

    fn unknown_reference(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "unknown_reference", message)
    }

    fn store(error: &anyhow::Error) -> Self {
        tracing::error!(error = %format!("{:#}", error), "Document store request failed");
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", "Document store unavailable")
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(json!({
            "error": {
                "code": self.code,
                "message": self.message,
                "details": self.details,
            }
        }))
    }
}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        match &err {
            ProductError::EmptyProductId | ProductError::EmptyName | ProductError::InvalidPrice(_) => {
                Self::validation(err.to_string())
            }
            ProductError::AlreadyExists(_) => Self::conflict(err.to_string()),
            ProductError::NotFound(_) => Self::not_found(err.to_string()),
            ProductError::Store(e) => Self::store(e),
        }
    }
}

impl From<VendorError> for ApiError {
    fn from(err: VendorError) -> Self {
        match &err {
            VendorError::EmptyVendorId | VendorError::EmptyName => Self::validation(err.to_string()),
            VendorError::UnknownProducts(ids) => {
                Self::unknown_reference(err.to_string()).with_details(json!({ "products": ids }))
            }
            VendorError::AlreadyExists(_) => Self::conflict(err.to_string()),
            VendorError::NotFound(_) => Self::not_found(err.to_string()),
            VendorError::Store(e) => Self::store(e),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match &err {
            OrderError::EmptyOrderId | OrderError::InvalidQuantity(_) | OrderError::InvalidStatus(_) => {
                Self::validation(err.to_string())
            }
            OrderError::UnknownProduct(_) | OrderError::UnknownVendor(_) => Self::unknown_reference(err.to_string()),
            OrderError::NotFound(_) => Self::not_found(err.to_string()),
            OrderError::Store(e) => Self::store(e),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match &err {
            ReportError::StoreRead(e) => Self::store(e),
        }
    }
}

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::InvalidRows(rows) => {
                Self::validation(format!("{} invalid row(s); nothing was imported", rows.len()))
                    .with_details(json!({ "rows": rows }))
            }
            TransferError::Csv(e) => Self::validation(format!("Malformed CSV: {}", e)),
            TransferError::Encoding(e) => {
                tracing::error!(error = %e, "CSV export produced invalid UTF-8");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", "CSV export failed")
            }
        }
    }
}
