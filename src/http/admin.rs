use actix_web::{web, HttpResponse};
use serde_json::{Map, Value};

use crate::store::Collection;
use super::auth::AdminOnly;
use super::error::ApiError;
use super::AppState;

/// Wipe all three collections; returns removed counts per collection
pub async fn reset(_: AdminOnly, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let mut removed = Map::new();
    for collection in Collection::ALL {
        let count = state.store.delete_all(collection).await.map_err(|e| {
            tracing::error!(collection = %collection, error = %format!("{:#}", e), "Reset failed");
            ApiError::new(
                actix_web::http::StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                format!("Failed to clear {}", collection),
            )
        })?;
        removed.insert(collection.name().to_string(), Value::from(count));
    }

    tracing::warn!(removed = ?removed, "🧹 Database reset");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "removed": removed })))
}
