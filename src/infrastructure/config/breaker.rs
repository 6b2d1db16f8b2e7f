//! Circuit breaker thresholds.

use std::time::Duration;

use serde::Deserialize;

use crate::domain::breaker::{
    BreakerSettings, DEFAULT_FAILURE_THRESHOLD, DEFAULT_RECOVERY_TIMEOUT, DEFAULT_SUCCESS_THRESHOLD,
};

/// Thresholds applied to every component's breaker at registration.
#[derive(Debug, Clone, Deserialize)]
pub struct BreakerConfig {
    /// Failures that trip the breaker open.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Seconds an open breaker waits before allowing a probe call.
    #[serde(default = "default_recovery_timeout_secs")]
    pub recovery_timeout_secs: u64,
    /// Probe successes needed to close a half-open breaker.
    #[serde(default = "default_success_threshold")]
    pub success_threshold: u32,
}

const fn default_failure_threshold() -> u32 {
    DEFAULT_FAILURE_THRESHOLD
}

const fn default_recovery_timeout_secs() -> u64 {
    DEFAULT_RECOVERY_TIMEOUT.as_secs()
}

const fn default_success_threshold() -> u32 {
    DEFAULT_SUCCESS_THRESHOLD
}

impl BreakerConfig {
    #[must_use]
    pub fn settings(&self) -> BreakerSettings {
        BreakerSettings {
            failure_threshold: self.failure_threshold,
            recovery_timeout: Duration::from_secs(self.recovery_timeout_secs),
            success_threshold: self.success_threshold,
        }
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            recovery_timeout_secs: default_recovery_timeout_secs(),
            success_threshold: default_success_threshold(),
        }
    }
}
