use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::domain::order::{OrderCommand, OrderDraft};
use crate::transfer::{export_orders, import_orders};
use super::auth::AdminOnly;
use super::error::ApiError;
use super::{csv_attachment, AppState, SearchQuery};

const ENTITY: &str = "order";

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::get().to(list))
            .route("", web::post().to(create))
            .route("/export", web::get().to(export))
            .route("/import", web::post().to(import))
            .route("/{order_id}", web::get().to(fetch))
            .route("/{order_id}", web::put().to(update))
            .route("/{order_id}", web::delete().to(remove)),
    );
}

async fn execute(state: &AppState, command: OrderCommand) -> Result<u64, ApiError> {
    let name = command.name();
    let result = state.orders.handle(command).await;
    state.metrics.record_command(ENTITY, name, result.is_ok());
    Ok(result?)
}

async fn list(
    _: AdminOnly,
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let orders = state.orders.list(query.term()).await?;
    Ok(HttpResponse::Ok().json(orders))
}

/// OrderID is not unique, so this returns every match
async fn fetch(_: AdminOnly, state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let orders = state.orders.get(&path).await?;
    Ok(HttpResponse::Ok().json(orders))
}

async fn create(
    _: AdminOnly,
    state: web::Data<AppState>,
    draft: web::Json<OrderDraft>,
) -> Result<HttpResponse, ApiError> {
    let draft = draft.into_inner();
    execute(&state, OrderCommand::Create(draft.clone())).await?;
    Ok(HttpResponse::Created().json(draft))
}

async fn update(
    _: AdminOnly,
    state: web::Data<AppState>,
    path: web::Path<String>,
    draft: web::Json<OrderDraft>,
) -> Result<HttpResponse, ApiError> {
    let updated = execute(
        &state,
        OrderCommand::Update {
            order_id: path.into_inner(),
            draft: draft.into_inner(),
        },
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "updated": updated })))
}

async fn remove(_: AdminOnly, state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let deleted = execute(&state, OrderCommand::Delete { order_id: path.into_inner() }).await?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": deleted })))
}

async fn export(_: AdminOnly, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let (orders, unreadable) = state.orders.all().await?;
    Ok(csv_attachment("orders.csv", export_orders(&orders)?, unreadable))
}

async fn import(_: AdminOnly, state: web::Data<AppState>, body: web::Bytes) -> Result<HttpResponse, ApiError> {
    let drafts = import_orders(body.as_ref())?;
    let imported = state.orders.import(drafts).await?;
    state.metrics.record_import(ENTITY, imported);
    Ok(HttpResponse::Ok().json(json!({ "imported": imported })))
}
