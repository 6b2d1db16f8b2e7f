//! Per-component circuit breaker.
//!
//! A pure state machine: it decides whether a call may be attempted and
//! tracks counters as a side effect, but never swallows the wrapped
//! operation's error.
//!
//! ```text
//! Closed   --(failure_count >= failure_threshold)--> Open
//! Open     --(recovery_timeout elapsed, next call)--> HalfOpen
//! HalfOpen --(success_count >= success_threshold)--> Closed
//! HalfOpen --(failure_count >= failure_threshold)--> Open
//! ```
//!
//! `failure_count` is not cleared when probing from `Open` into `HalfOpen`,
//! so a single failed probe re-opens the circuit.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::CallError;

/// Default number of failures that trips the breaker.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
/// Default cooldown before a probe call is allowed.
pub const DEFAULT_RECOVERY_TIMEOUT: Duration = Duration::from_secs(60);
/// Default number of probe successes needed to close again.
pub const DEFAULT_SUCCESS_THRESHOLD: u32 = 3;

/// Breaker state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Calls pass through.
    #[default]
    Closed,
    /// Calls fail fast without invoking the operation.
    Open,
    /// Probe calls are let through to test recovery.
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        })
    }
}

/// Thresholds for one breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSettings {
    pub failure_threshold: u32,
    pub recovery_timeout: Duration,
    pub success_threshold: u32,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            recovery_timeout: DEFAULT_RECOVERY_TIMEOUT,
            success_threshold: DEFAULT_SUCCESS_THRESHOLD,
        }
    }
}

/// Fail-fast rejection from an open breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("circuit breaker is open (retry in {}s)", .retry_after.as_secs())]
pub struct CircuitOpenError {
    /// Time left until a probe call will be allowed.
    pub retry_after: Duration,
}

/// Point-in-time view of a breaker, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakerStatus {
    pub state: CircuitState,
    pub failure_count: u32,
    pub success_count: u32,
    /// Seconds since the last recorded failure.
    pub last_failure_secs_ago: Option<f64>,
}

/// Circuit breaker guarding calls to one component.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    settings: BreakerSettings,
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    last_failure_time: Option<Instant>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(BreakerSettings::default())
    }
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(settings: BreakerSettings) -> Self {
        Self {
            settings,
            state: CircuitState::Closed,
            failure_count: 0,
            success_count: 0,
            last_failure_time: None,
        }
    }

    #[must_use]
    pub fn settings(&self) -> BreakerSettings {
        self.settings
    }

    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.state
    }

    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    #[must_use]
    pub fn success_count(&self) -> u32 {
        self.success_count
    }

    #[must_use]
    pub fn last_failure_time(&self) -> Option<Instant> {
        self.last_failure_time
    }

    /// Decide whether a call may proceed.
    ///
    /// Moves `Open` to `HalfOpen` once the recovery timeout has elapsed.
    ///
    /// # Errors
    ///
    /// Returns [`CircuitOpenError`] while the breaker is open and cooling down.
    pub fn acquire(&mut self) -> Result<(), CircuitOpenError> {
        if self.state != CircuitState::Open {
            return Ok(());
        }

        let elapsed = self
            .last_failure_time
            .map(|at| Instant::now().saturating_duration_since(at));

        match elapsed {
            Some(elapsed) if elapsed < self.settings.recovery_timeout => Err(CircuitOpenError {
                retry_after: self.settings.recovery_timeout - elapsed,
            }),
            _ => {
                debug!("Recovery timeout elapsed, probing in half-open state");
                self.state = CircuitState::HalfOpen;
                self.success_count = 0;
                Ok(())
            }
        }
    }

    /// Record a successful call.
    pub fn record_success(&mut self) {
        match self.state {
            CircuitState::HalfOpen => {
                self.success_count += 1;
                if self.success_count >= self.settings.success_threshold {
                    info!(
                        successes = self.success_count,
                        "Circuit breaker closed after successful probes"
                    );
                    self.reset();
                }
            }
            CircuitState::Closed => self.failure_count = 0,
            // A call admitted before another tripped the breaker; the open
            // window stands until its own timeout.
            CircuitState::Open => {}
        }
    }

    /// Record a failed call.
    pub fn record_failure(&mut self) {
        self.failure_count += 1;
        self.last_failure_time = Some(Instant::now());

        if self.failure_count >= self.settings.failure_threshold {
            if self.state != CircuitState::Open {
                warn!(
                    failures = self.failure_count,
                    cooldown_secs = self.settings.recovery_timeout.as_secs(),
                    "Circuit breaker tripped"
                );
            }
            self.state = CircuitState::Open;
            self.success_count = 0;
        }
    }

    /// Full reset to `Closed`.
    pub fn reset(&mut self) {
        self.state = CircuitState::Closed;
        self.failure_count = 0;
        self.success_count = 0;
        self.last_failure_time = None;
    }

    /// Run `op` through the breaker.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::CircuitOpen`] without invoking `op` while open,
    /// otherwise [`CallError::Failed`] carrying the operation's own error.
    pub async fn call<T, E, F, Fut>(&mut self, op: F) -> Result<T, CallError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.acquire()?;

        match op().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(err) => {
                self.record_failure();
                Err(CallError::Failed(err))
            }
        }
    }

    #[must_use]
    pub fn status(&self) -> BreakerStatus {
        BreakerStatus {
            state: self.state,
            failure_count: self.failure_count,
            success_count: self.success_count,
            last_failure_secs_ago: self
                .last_failure_time
                .map(|at| Instant::now().saturating_duration_since(at).as_secs_f64()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn settings(failure_threshold: u32, recovery_secs: u64, success_threshold: u32) -> BreakerSettings {
        BreakerSettings {
            failure_threshold,
            recovery_timeout: Duration::from_secs(recovery_secs),
            success_threshold,
        }
    }

    async fn fail(breaker: &mut CircuitBreaker) {
        let result: Result<(), CallError<&str>> = breaker.call(|| async { Err("boom") }).await;
        assert!(matches!(result, Err(CallError::Failed("boom"))));
    }

    async fn succeed(breaker: &mut CircuitBreaker) {
        let result: Result<u32, CallError<&str>> = breaker.call(|| async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[test]
    fn default_thresholds() {
        let breaker = CircuitBreaker::default();
        assert_eq!(breaker.settings().failure_threshold, 5);
        assert_eq!(breaker.settings().recovery_timeout, Duration::from_secs(60));
        assert_eq!(breaker.settings().success_threshold, 3);
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn trips_after_failure_threshold() {
        let mut breaker = CircuitBreaker::new(settings(3, 60, 1));

        fail(&mut breaker).await;
        fail(&mut breaker).await;
        assert_eq!(breaker.state(), CircuitState::Closed);

        fail(&mut breaker).await;
        assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn open_breaker_does_not_invoke_operation() {
        let mut breaker = CircuitBreaker::new(settings(1, 60, 1));
        fail(&mut breaker).await;

        let calls = AtomicU32::new(0);
        let result: Result<(), CallError<&str>> = breaker
            .call(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(CallError::CircuitOpen(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn success_in_closed_clears_failure_count() {
        let mut breaker = CircuitBreaker::new(settings(3, 60, 1));

        fail(&mut breaker).await;
        fail(&mut breaker).await;
        succeed(&mut breaker).await;

        assert_eq!(breaker.failure_count(), 0);
        fail(&mut breaker).await;
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn half_open_after_recovery_timeout() {
        let mut breaker = CircuitBreaker::new(settings(1, 60, 2));
        fail(&mut breaker).await;

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(breaker.acquire().is_err());

        tokio::time::advance(Duration::from_secs(1)).await;
        succeed(&mut breaker).await;
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        assert_eq!(breaker.success_count(), 1);

        succeed(&mut breaker).await;
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.failure_count(), 0);
        assert_eq!(breaker.success_count(), 0);
        assert!(breaker.last_failure_time().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn single_failure_in_half_open_reopens() {
        let mut breaker = CircuitBreaker::new(settings(2, 10, 3));
        fail(&mut breaker).await;
        fail(&mut breaker).await;

        tokio::time::advance(Duration::from_secs(10)).await;
        succeed(&mut breaker).await;
        assert_eq!(breaker.state(), CircuitState::HalfOpen);

        fail(&mut breaker).await;
        assert_eq!(breaker.state(), CircuitState::Open);
        assert_eq!(breaker.success_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_counts_down() {
        let mut breaker = CircuitBreaker::new(settings(1, 30, 1));
        fail(&mut breaker).await;

        tokio::time::advance(Duration::from_secs(20)).await;
        let err = breaker.acquire().unwrap_err();
        assert_eq!(err.retry_after, Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn status_reflects_counters() {
        let mut breaker = CircuitBreaker::new(settings(5, 60, 1));
        fail(&mut breaker).await;
        fail(&mut breaker).await;

        let status = breaker.status();
        assert_eq!(status.state, CircuitState::Closed);
        assert_eq!(status.failure_count, 2);
        assert_eq!(status.success_count, 0);
        assert!(status.last_failure_secs_ago.is_some());
    }
}
