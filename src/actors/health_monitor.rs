use actix::prelude::*;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::metrics::Metrics;
use crate::store::DocumentStore;
use super::health::{ComponentHealth, HealthStatus, SystemHealth};

// ============================================================================
// Health Monitor Actor - Monitors system health
// ============================================================================
//
// Responsibilities:
// - Probe the document store on a fixed interval
// - Track the last known health of each component
// - Aggregate system-wide health for the /health endpoint
//
// ============================================================================

pub const STORE_COMPONENT: &str = "document_store";

const PING_TIMEOUT: Duration = Duration::from_secs(5);
const SLOW_PING: Duration = Duration::from_secs(1);

// ============================================================================
// Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "()")]
pub struct UpdateHealth {
    pub component: String,
    pub status: HealthStatus,
    pub details: Option<String>,
}

#[derive(Message)]
#[rtype(result = "SystemHealth")]
pub struct GetSystemHealth;

// ============================================================================
// Store Probe
// ============================================================================

/// Ping the store once and classify the outcome
pub async fn store_health(store: &dyn DocumentStore) -> (HealthStatus, Option<String>) {
    let started = Instant::now();
    match tokio::time::timeout(PING_TIMEOUT, store.ping()).await {
        Ok(Ok(())) => {
            let elapsed = started.elapsed();
            let details = Some(format!("ping {} ms", elapsed.as_millis()));
            if elapsed > SLOW_PING {
                (HealthStatus::Degraded("Slow ping".to_string()), details)
            } else {
                (HealthStatus::Healthy, details)
            }
        }
        Ok(Err(e)) => (HealthStatus::Unhealthy(format!("{:#}", e)), None),
        Err(_) => (
            HealthStatus::Unhealthy(format!("No reply within {}s", PING_TIMEOUT.as_secs())),
            None,
        ),
    }
}

// ============================================================================
// Health Monitor Actor
// ============================================================================

pub struct HealthMonitorActor {
    components: BTreeMap<String, ComponentHealth>,
    store: Arc<dyn DocumentStore>,
    metrics: Arc<Metrics>,
    interval: Duration,
}

impl HealthMonitorActor {
    pub fn new(store: Arc<dyn DocumentStore>, metrics: Arc<Metrics>, interval: Duration) -> Self {
        Self {
            components: BTreeMap::new(),
            store,
            metrics,
            interval,
        }
    }

    fn compute_overall_status(&self) -> HealthStatus {
        if self.components.is_empty() {
            return HealthStatus::Degraded("No health checks have completed yet".to_string());
        }

        let mut has_degraded = false;
        let mut unhealthy_components = Vec::new();

        for (name, health) in &self.components {
            match &health.status {
                HealthStatus::Unhealthy(msg) => {
                    unhealthy_components.push(format!("{}: {}", name, msg));
                }
                HealthStatus::Degraded(_) => {
                    has_degraded = true;
                }
                HealthStatus::Healthy => {}
            }
        }

        if !unhealthy_components.is_empty() {
            HealthStatus::Unhealthy(unhealthy_components.join(", "))
        } else if has_degraded {
            HealthStatus::Degraded("Some components degraded".to_string())
        } else {
            HealthStatus::Healthy
        }
    }

    fn check_store(&self, ctx: &mut Context<Self>) {
        let store = self.store.clone();
        let addr = ctx.address();

        actix::spawn(async move {
            let (status, details) = store_health(store.as_ref()).await;
            addr.do_send(UpdateHealth {
                component: STORE_COMPONENT.to_string(),
                status,
                details,
            });
        });
    }
}

impl Actor for HealthMonitorActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(interval_secs = self.interval.as_secs(), "HealthMonitorActor started");

        self.check_store(ctx);
        ctx.run_interval(self.interval, |act, ctx| act.check_store(ctx));
    }
}

impl Handler<UpdateHealth> for HealthMonitorActor {
    type Result = ();

    fn handle(&mut self, msg: UpdateHealth, _: &mut Self::Context) {
        if msg.component == STORE_COMPONENT {
            self.metrics.update_store_health(msg.status.as_gauge());
        }

        let previous = self.components.get(&msg.component).map(|h| h.status.clone());
        if previous.as_ref() != Some(&msg.status) {
            if msg.status.is_unhealthy() {
                tracing::error!(component = %msg.component, status = ?msg.status, "Component unhealthy");
            } else {
                tracing::info!(component = %msg.component, status = ?msg.status, "Component health changed");
            }
        }

        let health = ComponentHealth {
            name: msg.component.clone(),
            status: msg.status,
            last_check: Utc::now(),
            details: msg.details,
        };
        self.components.insert(msg.component, health);
    }
}

impl Handler<GetSystemHealth> for HealthMonitorActor {
    type Result = MessageResult<GetSystemHealth>;

    fn handle(&mut self, _msg: GetSystemHealth, _: &mut Self::Context) -> Self::Result {
        MessageResult(SystemHealth {
            overall_status: self.compute_overall_status(),
            components: self.components.values().cloned().collect(),
            check_time: Utc::now(),
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
