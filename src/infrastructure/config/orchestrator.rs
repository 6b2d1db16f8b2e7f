//! Health monitoring and recovery timing.

use std::time::Duration;

use serde::Deserialize;

/// Orchestrator loop and recovery configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    /// Seconds between health-check cycles.
    #[serde(default = "default_health_check_interval_secs")]
    pub health_check_interval_secs: u64,
    /// Recovery attempts allowed before a chain is abandoned.
    #[serde(default = "default_max_recovery_attempts")]
    pub max_recovery_attempts: u32,
    /// Seconds to wait between failed recovery attempts.
    #[serde(default = "default_failover_timeout_secs")]
    pub failover_timeout_secs: u64,
    /// Failure history cap, oldest entries evicted first. Zero keeps everything.
    #[serde(default = "default_max_failure_history")]
    pub max_failure_history: usize,
    /// Window counted as "recent" in system health.
    #[serde(default = "default_recent_failure_window_secs")]
    pub recent_failure_window_secs: u64,
}

const fn default_health_check_interval_secs() -> u64 {
    30
}

const fn default_max_recovery_attempts() -> u32 {
    3
}

const fn default_failover_timeout_secs() -> u64 {
    60
}

const fn default_max_failure_history() -> usize {
    10_000
}

const fn default_recent_failure_window_secs() -> u64 {
    3600
}

impl OrchestratorConfig {
    /// Interval between health-check cycles, never shorter than one second.
    #[must_use]
    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_secs.max(1))
    }

    #[must_use]
    pub fn failover_timeout(&self) -> Duration {
        Duration::from_secs(self.failover_timeout_secs)
    }

    #[must_use]
    pub fn recent_failure_window(&self) -> Duration {
        Duration::from_secs(self.recent_failure_window_secs)
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            health_check_interval_secs: default_health_check_interval_secs(),
            max_recovery_attempts: default_max_recovery_attempts(),
            failover_timeout_secs: default_failover_timeout_secs(),
            max_failure_history: default_max_failure_history(),
            recent_failure_window_secs: default_recent_failure_window_secs(),
        }
    }
}
