use actix::prelude::*;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod actors;
mod config;
mod domain;
mod http;
mod metrics;
mod reporting;
mod store;
mod transfer;
mod utils;

use actors::HealthMonitorActor;
use config::{AppConfig, StoreBackend};
use store::{DocumentStore, InMemoryDocumentStore, ScyllaDocumentStore};
use utils::retry_with_backoff;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::parse();

    // RUST_LOG wins over the configured default filter
    // Example: RUST_LOG=debug cargo run -- --store memory
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)))
        .init();

    tracing::info!("🚀 Starting Supply Chain Tracker");

    // === 1. Open the single store handle ===
    let store: Arc<dyn DocumentStore> = match config.store {
        StoreBackend::Scylla => {
            let store = retry_with_backoff("scylla_connect", &config.connect_retry(), |_attempt| {
                ScyllaDocumentStore::connect(&config.scylla_nodes, &config.keyspace)
            })
            .await?;
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on exit");
            Arc::new(InMemoryDocumentStore::new())
        }
    };

    // === 2. Initialize Prometheus metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 3. Start health monitor ===
    let health = HealthMonitorActor::new(store.clone(), metrics.clone(), config.health_interval()).start();

    // === 4. Serve the API ===
    let state = http::AppState::new(store, metrics);
    http::serve(&config.bind, config.port, state, health).await?;

    tracing::info!("👋 Shutting down");
    Ok(())
}
