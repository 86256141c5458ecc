// ============================================================================
// HTTP API
// ============================================================================
//
// - /api/dashboard       any authenticated role
// - /api/products|vendors|orders, /api/reset   admin only
// - /health, /metrics    unauthenticated
//
// Every handler shares one AppState built around a single store handle.
//
// ============================================================================

mod admin;
mod auth;
mod dashboard;
mod error;
mod orders;
mod products;
mod vendors;

use actix::Addr;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;

use crate::actors::HealthMonitorActor;
use crate::domain::order::OrderCommandHandler;
use crate::domain::product::ProductCommandHandler;
use crate::domain::vendor::VendorCommandHandler;
use crate::metrics::{metrics_handler, Metrics};
use crate::reporting::ReportingEngine;
use crate::store::DocumentStore;

/// Upper bound for CSV upload bodies
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// `?q=` on list routes
#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct SearchQuery {
    #[serde(default)]
    q: Option<String>,
}

impl SearchQuery {
    pub(crate) fn term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// Number of stored documents an export could not include
pub(crate) const SKIPPED_ROWS_HEADER: &str = "X-Skipped-Rows";

pub(crate) fn csv_attachment(filename: &str, body: String, skipped: usize) -> actix_web::HttpResponse {
    if skipped > 0 {
        tracing::warn!(filename, skipped, "CSV export left out documents without a key");
    }
    actix_web::HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            actix_web::http::header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ))
        .insert_header((SKIPPED_ROWS_HEADER, skipped.to_string()))
        .body(body)
}

pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub metrics: Arc<Metrics>,
    pub engine: ReportingEngine,
    pub products: ProductCommandHandler,
    pub vendors: VendorCommandHandler,
    pub orders: OrderCommandHandler,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, metrics: Arc<Metrics>) -> Self {
        Self {
            engine: ReportingEngine::new(store.clone(), metrics.clone()),
            products: ProductCommandHandler::new(store.clone()),
            vendors: VendorCommandHandler::new(store.clone()),
            orders: OrderCommandHandler::new(store.clone()),
            store,
            metrics,
        }
    }
}

/// Route table, shared by the server and the handler tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
        .route("/health", web::get().to(dashboard::health))
        .route("/metrics", web::get().to(metrics_handler))
        .service(
            web::scope("/api")
                .route("/dashboard", web::get().to(dashboard::render))
                .route("/reset", web::post().to(admin::reset))
                .configure(products::routes)
                .configure(vendors::routes)
                .configure(orders::routes),
        );
}

pub async fn serve(
    bind: &str,
    port: u16,
    state: AppState,
    health: Addr<HealthMonitorActor>,
) -> std::io::Result<()> {
    let metrics = web::Data::new(state.metrics.clone());
    let state = web::Data::new(state);
    let health = web::Data::new(health);

    tracing::info!("🌐 Starting HTTP server on http://{}:{}", bind, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(metrics.clone())
            .app_data(health.clone())
            .configure(configure)
    })
    .bind((bind, port))?
    .run()
    .await
}
