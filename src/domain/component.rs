//! Tracked components and their request-level health metrics.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a registered component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    Active,
    /// Initial status on registration.
    #[default]
    Standby,
    Failed,
    Recovering,
    Maintenance,
}

impl ComponentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Standby => "standby",
            Self::Failed => "failed",
            Self::Recovering => "recovering",
            Self::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request-level health metrics for one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    /// Reserved for collaborators; no algorithm reads it.
    pub response_time: f64,
    pub error_rate: f64,
    /// `successful_requests / total_requests`, 1.0 before any request.
    pub success_rate: f64,
    pub uptime_percentage: f64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub total_requests: u64,
    pub successful_requests: u64,
}

impl Default for HealthMetrics {
    fn default() -> Self {
        Self {
            response_time: 0.0,
            error_rate: 0.0,
            success_rate: 1.0,
            uptime_percentage: 100.0,
            last_success: None,
            last_failure: None,
            consecutive_failures: 0,
            total_requests: 0,
            successful_requests: 0,
        }
    }
}

impl HealthMetrics {
    /// Record a successful guarded call.
    pub fn record_success(&mut self, at: DateTime<Utc>) {
        self.total_requests += 1;
        self.successful_requests += 1;
        self.last_success = Some(at);
        self.consecutive_failures = 0;
        self.refresh_rates();
    }

    /// Record a guarded call whose primary and fallbacks all failed.
    pub fn record_failure(&mut self, at: DateTime<Utc>) {
        self.total_requests += 1;
        self.last_failure = Some(at);
        self.consecutive_failures += 1;
        self.refresh_rates();
    }

    fn refresh_rates(&mut self) {
        if self.total_requests > 0 {
            self.success_rate = self.successful_requests as f64 / self.total_requests as f64;
            self.error_rate = 1.0 - self.success_rate;
        }
    }
}

/// Snapshot of a registered component.
///
/// The live record is owned by the registry; callers only ever see clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub status: ComponentStatus,
    pub health_metrics: HealthMetrics,
    /// Last time a health check completed for this component.
    pub last_check: Option<DateTime<Utc>>,
    pub failover_count: u32,
    pub recovery_attempts: u32,
}

impl Component {
    /// A freshly registered component in [`ComponentStatus::Standby`].
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ComponentStatus::Standby,
            health_metrics: HealthMetrics::default(),
            last_check: None,
            failover_count: 0,
            recovery_attempts: 0,
        }
    }
}
