//! Health reporting for [`AppContext`](crate::AppContext) components

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Share of healthy components required for the gateway to report healthy
const HEALTHY_THRESHOLD: f64 = 0.8;

/// Aggregated health of the gateway
///
/// # Example
/// ```
/// use carrierlink_api::{ComponentHealth, HealthStatus};
///
/// let status = HealthStatus::from_components(vec![
///     ComponentHealth::healthy("database"),
///     ComponentHealth::unhealthy("credential_sweeper", "not running"),
/// ]);
///
/// assert!(!status.is_healthy);
/// assert_eq!(status.message.as_deref(), Some("degraded: credential_sweeper"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub is_healthy: bool,
    /// Healthy components over all components, 1.0 when there are none
    pub score: f64,
    pub message: Option<String>,
    pub components: Vec<ComponentHealth>,
    pub checked_at: DateTime<Utc>,
}

impl HealthStatus {
    #[allow(clippy::cast_precision_loss)]
    pub fn from_components(components: Vec<ComponentHealth>) -> Self {
        let failing: Vec<&str> =
            components.iter().filter(|c| !c.is_healthy).map(|c| c.name.as_str()).collect();

        let score = if components.is_empty() {
            1.0
        } else {
            (components.len() - failing.len()) as f64 / components.len() as f64
        };
        let is_healthy = score >= HEALTHY_THRESHOLD;
        let message = (!failing.is_empty()).then(|| {
            let state = if is_healthy { "partially degraded" } else { "degraded" };
            format!("{state}: {}", failing.join(", "))
        });

        Self { is_healthy, score, message, components, checked_at: Utc::now() }
    }

    pub fn component(&self, name: &str) -> Option<&ComponentHealth> {
        self.components.iter().find(|c| c.name == name)
    }
}

/// Health of one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub is_healthy: bool,
    /// Failure reason, or informational detail for healthy components
    pub detail: Option<String>,
}

impl ComponentHealth {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: true, detail: None }
    }

    pub fn unhealthy(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: false, detail: Some(reason.into()) }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
