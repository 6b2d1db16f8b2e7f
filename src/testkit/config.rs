//! Canonical test configurations.
//!
//! Single source of truth for settings used across tests, so each test
//! module does not define its own slightly-different thresholds.

use std::time::Duration;

use crate::domain::breaker::BreakerSettings;
use crate::infrastructure::config::OrchestratorConfig;

/// Breaker that trips after `failures`, probes after `timeout_secs`, and
/// closes after `successes` probe successes.
pub fn breaker(failures: u32, timeout_secs: u64, successes: u32) -> BreakerSettings {
    BreakerSettings {
        failure_threshold: failures,
        recovery_timeout: Duration::from_secs(timeout_secs),
        success_threshold: successes,
    }
}

/// Orchestrator settings with explicit recovery attempts and delay.
///
/// Health checks run every `interval_secs`; history is unbounded.
pub fn orchestrator(
    interval_secs: u64,
    max_recovery_attempts: u32,
    recovery_delay_secs: u64,
) -> OrchestratorConfig {
    OrchestratorConfig {
        health_check_interval_secs: interval_secs,
        max_recovery_attempts,
        failover_timeout_secs: recovery_delay_secs,
        max_failure_history: 0,
        recent_failure_window_secs: 3600,
    }
}
