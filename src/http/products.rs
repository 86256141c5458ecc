use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::domain::product::{ProductCommand, ProductDraft};
use crate::transfer::{export_products, import_products};
use super::auth::AdminOnly;
use super::error::ApiError;
use super::{csv_attachment, AppState, SearchQuery};

const ENTITY: &str = "product";

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/products")
            .route("", web::get().to(list))
            .route("", web::post().to(create))
            .route("/export", web::get().to(export))
            .route("/import", web::post().to(import))
            .route("/{product_id}", web::get().to(fetch))
            .route("/{product_id}", web::put().to(update))
            .route("/{product_id}", web::delete().to(remove)),
    );
}

async fn execute(state: &AppState, command: ProductCommand) -> Result<u64, ApiError> {
    let name = command.name();
    let result = state.products.handle(command).await;
    state.metrics.record_command(ENTITY, name, result.is_ok());
    Ok(result?)
}

async fn list(
    _: AdminOnly,
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let products = state.products.list(query.term()).await?;
    Ok(HttpResponse::Ok().json(products))
}

async fn fetch(_: AdminOnly, state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let product = state.products.get(&path).await?;
    Ok(HttpResponse::Ok().json(product))
}

async fn create(
    _: AdminOnly,
    state: web::Data<AppState>,
    draft: web::Json<ProductDraft>,
) -> Result<HttpResponse, ApiError> {
    let draft = draft.into_inner();
    execute(&state, ProductCommand::Create(draft.clone())).await?;
    Ok(HttpResponse::Created().json(draft))
}

async fn update(
    _: AdminOnly,
    state: web::Data<AppState>,
    path: web::Path<String>,
    draft: web::Json<ProductDraft>,
) -> Result<HttpResponse, ApiError> {
    let updated = execute(
        &state,
        ProductCommand::Update {
            product_id: path.into_inner(),
            draft: draft.into_inner(),
        },
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "updated": updated })))
}

async fn remove(_: AdminOnly, state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let deleted = execute(&state, ProductCommand::Delete { product_id: path.into_inner() }).await?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": deleted })))
}

async fn export(_: AdminOnly, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let (products, unreadable) = state.products.all().await?;
    Ok(csv_attachment("products.csv", export_products(&products)?, unreadable))
}

async fn import(_: AdminOnly, state: web::Data<AppState>, body: web::Bytes) -> Result<HttpResponse, ApiError> {
    let drafts = import_products(body.as_ref())?;
    let imported = state.products.import(drafts).await?;
    state.metrics.record_import(ENTITY, imported);
    Ok(HttpResponse::Ok().json(json!({ "imported": imported })))
}

// ============================================================================
// Handler Tests
// ============================================================================
