use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::domain::vendor::{VendorCommand, VendorDraft};
use crate::transfer::{export_vendors, import_vendors};
use super::auth::AdminOnly;
use super::error::ApiError;
use super::{csv_attachment, AppState, SearchQuery};

const ENTITY: &str = "vendor";

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/vendors")
            .route("", web::get().to(list))
            .route("", web::post().to(create))
            .route("/export", web::get().to(export))
            .route("/import", web::post().to(import))
            .route("/{vendor_id}", web::get().to(fetch))
            .route("/{vendor_id}", web::put().to(update))
            .route("/{vendor_id}", web::delete().to(remove)),
    );
}

async fn execute(state: &AppState, command: VendorCommand) -> Result<u64, ApiError> {
    let name = command.name();
    let result = state.vendors.handle(command).await;
    state.metrics.record_command(ENTITY, name, result.is_ok());
    Ok(result?)
}

async fn list(
    _: AdminOnly,
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let vendors = state.vendors.list(query.term()).await?;
    Ok(HttpResponse::Ok().json(vendors))
}

async fn fetch(_: AdminOnly, state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let vendor = state.vendors.get(&path).await?;
    Ok(HttpResponse::Ok().json(vendor))
}

async fn create(
    _: AdminOnly,
    state: web::Data<AppState>,
    draft: web::Json<VendorDraft>,
) -> Result<HttpResponse, ApiError> {
    let draft = draft.into_inner();
    execute(&state, VendorCommand::Create(draft.clone())).await?;
    Ok(HttpResponse::Created().json(draft))
}

async fn update(
    _: AdminOnly,
    state: web::Data<AppState>,
    path: web::Path<String>,
    draft: web::Json<VendorDraft>,
) -> Result<HttpResponse, ApiError> {
    let updated = execute(
        &state,
        VendorCommand::Update {
            vendor_id: path.into_inner(),
            draft: draft.into_inner(),
        },
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "updated": updated })))
}

async fn remove(_: AdminOnly, state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let deleted = execute(&state, VendorCommand::Delete { vendor_id: path.into_inner() }).await?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": deleted })))
}

async fn export(_: AdminOnly, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let (vendors, unreadable) = state.vendors.all().await?;
    Ok(csv_attachment("vendors.csv", export_vendors(&vendors)?, unreadable))
}

async fn import(_: AdminOnly, state: web::Data<AppState>, body: web::Bytes) -> Result<HttpResponse, ApiError> {
    let drafts = import_vendors(body.as_ref())?;
    let imported = state.vendors.import(drafts).await?;
    state.metrics.record_import(ENTITY, imported);
    Ok(HttpResponse::Ok().json(json!({ "imported": imported })))
}
