//! Aggregate health and failure-report value types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::component::ComponentStatus;
use super::failure::FailureType;

/// Overall system status derived from component statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
    /// No component is failed.
    Healthy,
    /// Some, but at most half, of the components are failed.
    Degraded,
    /// More than half of the components are failed.
    Critical,
}

impl SystemStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-component entry in [`SystemHealth`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    /// Derived 0–100 score.
    pub health_score: f64,
    pub last_check: Option<DateTime<Utc>>,
    pub failover_count: u32,
}

/// Snapshot of system-wide health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemHealth {
    pub overall_status: SystemStatus,
    /// Percentage of components that are active.
    pub health_score: f64,
    pub total_components: usize,
    pub active_components: usize,
    pub failed_components: usize,
    /// Failures reported within the recent-failure window.
    pub recent_failures: usize,
    pub uptime_percentage: f64,
    pub component_details: BTreeMap<String, ComponentHealth>,
}

/// Windowed summary of the failure history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReport {
    pub window_hours: u32,
    pub total_failures: usize,
    pub failures_by_type: BTreeMap<FailureType, usize>,
    pub failures_by_component: BTreeMap<String, usize>,
    pub unresolved_failures: usize,
    /// Mean seconds from failure to resolution, over resolved entries.
    pub average_resolution_time: Option<f64>,
}
