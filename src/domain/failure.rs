//! Failure taxonomy and the failure-event log entry.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification of a reported component failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureType {
    NetworkError,
    ApiError,
    DataCorruption,
    Timeout,
    ResourceExhaustion,
    ConfigurationError,
    Unknown,
}

impl FailureType {
    /// Stable name used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::ApiError => "api_error",
            Self::DataCorruption => "data_corruption",
            Self::Timeout => "timeout",
            Self::ResourceExhaustion => "resource_exhaustion",
            Self::ConfigurationError => "configuration_error",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How serious a reported failure is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    #[default]
    Error,
    Critical,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in the failure history.
///
/// Created unresolved when a failure is reported. A later recovery report
/// for the same component flips `resolved` and stamps `resolution_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureEvent {
    /// Unique identifier for external correlation.
    pub id: Uuid,
    /// Name of the component that failed.
    pub component: String,
    pub failure_type: FailureType,
    pub timestamp: DateTime<Utc>,
    pub error_message: String,
    pub severity: Severity,
    /// Free-form description of what was done about it, if anything.
    pub recovery_action: Option<String>,
    pub resolved: bool,
    pub resolution_time: Option<DateTime<Utc>>,
}

impl FailureEvent {
    /// Create a new unresolved failure event.
    #[must_use]
    pub fn new(
        component: impl Into<String>,
        failure_type: FailureType,
        error_message: impl Into<String>,
        severity: Severity,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            component: component.into(),
            failure_type,
            timestamp,
            error_message: error_message.into(),
            severity,
            recovery_action: None,
            resolved: false,
            resolution_time: None,
        }
    }

    /// Mark this event resolved at `at`.
    pub fn resolve(&mut self, at: DateTime<Utc>) {
        self.resolved = true;
        self.resolution_time = Some(at);
    }

    /// Seconds between the failure and its resolution, if resolved.
    #[must_use]
    pub fn resolution_secs(&self) -> Option<f64> {
        if !self.resolved {
            return None;
        }
        self.resolution_time
            .map(|at| (at - self.timestamp).num_milliseconds() as f64 / 1000.0)
    }
}
