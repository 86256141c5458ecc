use actix::Addr;
use actix_web::{web, HttpResponse};

use crate::actors::{GetSystemHealth, HealthMonitorActor, HealthStatus};
use super::auth::Authenticated;
use super::error::ApiError;
use super::AppState;

/// Full dashboard for admins and viewers alike
pub async fn render(user: Authenticated, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    tracing::debug!(role = ?user.0, "Dashboard requested");
    let report = state.engine.render().await?;
    Ok(HttpResponse::Ok().json(report))
}

/// Last known component health; 503 while any component is unhealthy
pub async fn health(monitor: web::Data<Addr<HealthMonitorActor>>) -> HttpResponse {
    match monitor.send(GetSystemHealth).await {
        Ok(health) => {
            let mut response = match health.overall_status {
                HealthStatus::Unhealthy(_) => HttpResponse::ServiceUnavailable(),
                _ => HttpResponse::Ok(),
            };
            response.json(health)
        }
        Err(e) => {
            tracing::error!(error = %e, "Health monitor unreachable");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "overall_status": HealthStatus::Unhealthy("Health monitor unreachable".to_string())
            }))
        }
    }
}
