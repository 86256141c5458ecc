use clap::{Parser, ValueEnum};
use std::time::Duration;

use crate::utils::RetryConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// ScyllaDB cluster
    Scylla,
    /// Process-local store, contents are lost on exit
    Memory,
}

/// Supply chain tracker: CRUD API and reporting dashboard
#[derive(Debug, Clone, Parser)]
#[command(name = "supply_chain_tracker", version, about)]
pub struct AppConfig {
    #[arg(long, value_enum, env = "SUPPLY_CHAIN_STORE", default_value = "scylla")]
    pub store: StoreBackend,

    /// Comma separated contact points
    #[arg(
        long,
        env = "SUPPLY_CHAIN_SCYLLA_NODES",
        value_delimiter = ',',
        default_value = "127.0.0.1:9042"
    )]
    pub scylla_nodes: Vec<String>,

    #[arg(long, env = "SUPPLY_CHAIN_KEYSPACE", default_value = "supply_chain")]
    pub keyspace: String,

    #[arg(long, env = "SUPPLY_CHAIN_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    #[arg(long, env = "SUPPLY_CHAIN_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Used when RUST_LOG is not set
    #[arg(long, env = "SUPPLY_CHAIN_LOG", default_value = "info,supply_chain_tracker=debug")]
    pub log_filter: String,

    /// Store connection attempts before giving up at startup
    #[arg(long, env = "SUPPLY_CHAIN_CONNECT_ATTEMPTS", default_value_t = 5)]
    pub connect_attempts: u32,

    #[arg(long, env = "SUPPLY_CHAIN_HEALTH_INTERVAL_SECS", default_value_t = 10)]
    pub health_interval_secs: u64,
}

impl AppConfig {
    pub fn connect_retry(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.connect_attempts.max(1),
            ..RetryConfig::default()
        }
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs.max(1))
    }
}
