use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Health Types
// ============================================================================

/// Health status of a component
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_unhealthy(&self) -> bool {
        matches!(self, HealthStatus::Unhealthy(_))
    }

    /// Gauge encoding: 0 = unhealthy, 1 = degraded, 2 = healthy
    pub fn as_gauge(&self) -> u8 {
        match self {
            HealthStatus::Healthy => 2,
            HealthStatus::Degraded(_) => 1,
            HealthStatus::Unhealthy(_) => 0,
        }
    }
}

/// Health information for a component
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    pub overall_status: HealthStatus,
    pub components: Vec<ComponentHealth>,
    pub check_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_value(HealthStatus::Healthy).unwrap(), json!({"status": "healthy"}));
        assert_eq!(
            serde_json::to_value(HealthStatus::Unhealthy("timeout".to_string())).unwrap(),
            json!({"status": "unhealthy", "reason": "timeout"})
        );
    }

    #[test]
    fn test_gauge_encoding() {
        assert_eq!(HealthStatus::Healthy.as_gauge(), 2);
        assert_eq!(HealthStatus::Degraded("slow".to_string()).as_gauge(), 1);
        assert_eq!(HealthStatus::Unhealthy("down".to_string()).as_gauge(), 0);
    }
}
