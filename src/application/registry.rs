//! Component registry and failure history.
//!
//! Components live in an arena (a `Vec` plus a name→index map) and are never
//! removed. All state, including each component's circuit breaker and the
//! failure history, sits behind one mutex. Callers take the lock for a
//! single synchronous step and never across an `.await`.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::debug;

use crate::domain::breaker::{BreakerSettings, BreakerStatus, CircuitBreaker, CircuitOpenError};
use crate::domain::component::{Component, ComponentStatus};
use crate::domain::failure::{FailureEvent, FailureType, Severity};
use crate::port::probe::{HealthCheck, Recovery};

struct ComponentEntry {
    component: Component,
    breaker: CircuitBreaker,
    health_check: Option<Arc<dyn HealthCheck>>,
    recovery: Option<Arc<dyn Recovery>>,
}

#[derive(Default)]
struct RegistryInner {
    index: HashMap<String, usize>,
    entries: Vec<ComponentEntry>,
    history: VecDeque<FailureEvent>,
}

impl RegistryInner {
    fn entry_mut(&mut self, name: &str) -> Option<&mut ComponentEntry> {
        let idx = *self.index.get(name)?;
        self.entries.get_mut(idx)
    }

    fn entry(&self, name: &str) -> Option<&ComponentEntry> {
        let idx = *self.index.get(name)?;
        self.entries.get(idx)
    }
}

/// Outcome of a failure report against the registry.
pub(crate) struct RecordedFailure {
    pub event: FailureEvent,
    /// Recovery routine to schedule, when the component has one attached.
    pub recovery: Option<Arc<dyn Recovery>>,
}

/// Result of starting one recovery attempt.
pub(crate) enum RecoveryAttempt {
    /// Go ahead; the component is now `Recovering`.
    Ready {
        attempt: u32,
        recovery: Arc<dyn Recovery>,
    },
    /// The attempt cap was exceeded.
    Exhausted { attempts: u32 },
    /// The component is unknown or has no recovery routine.
    Unavailable,
}

/// Owner of every [`Component`] record, its breaker, and the failure history.
pub struct ComponentRegistry {
    inner: Mutex<RegistryInner>,
    breaker_settings: BreakerSettings,
    max_history: usize,
}

impl ComponentRegistry {
    /// Create an empty registry.
    ///
    /// `max_history` caps the failure history, evicting the oldest entries;
    /// zero keeps everything.
    #[must_use]
    pub fn new(breaker_settings: BreakerSettings, max_history: usize) -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
            breaker_settings,
            max_history,
        }
    }

    /// Register a component, or update the callables of an existing one.
    ///
    /// New components start in `Standby` with a fresh breaker. Supplied
    /// callables replace existing ones; `None` leaves them untouched.
    /// Returns `true` if the component was newly created.
    pub fn register(
        &self,
        name: &str,
        health_check: Option<Arc<dyn HealthCheck>>,
        recovery: Option<Arc<dyn Recovery>>,
    ) -> bool {
        let mut inner = self.inner.lock();

        let created = if inner.index.contains_key(name) {
            false
        } else {
            let idx = inner.entries.len();
            inner.entries.push(ComponentEntry {
                component: Component::new(name),
                breaker: CircuitBreaker::new(self.breaker_settings),
                health_check: None,
                recovery: None,
            });
            inner.index.insert(name.to_string(), idx);
            true
        };

        if let Some(entry) = inner.entry_mut(name) {
            if health_check.is_some() {
                entry.health_check = health_check;
            }
            if recovery.is_some() {
                entry.recovery = recovery;
            }
        }

        created
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.lock().index.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn status(&self, name: &str) -> Option<ComponentStatus> {
        self.inner.lock().entry(name).map(|e| e.component.status)
    }

    /// Snapshot of one component.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<Component> {
        self.inner.lock().entry(name).map(|e| e.component.clone())
    }

    /// Snapshots of all components in registration order.
    #[must_use]
    pub fn components(&self) -> Vec<Component> {
        self.inner
            .lock()
            .entries
            .iter()
            .map(|e| e.component.clone())
            .collect()
    }

    /// Snapshot of the failure history in stored order.
    #[must_use]
    pub fn history(&self) -> Vec<FailureEvent> {
        self.inner.lock().history.iter().cloned().collect()
    }

    /// Components and history taken under one lock, for consistent metrics.
    #[must_use]
    pub fn snapshot(&self) -> (Vec<Component>, Vec<FailureEvent>) {
        let inner = self.inner.lock();
        (
            inner.entries.iter().map(|e| e.component.clone()).collect(),
            inner.history.iter().cloned().collect(),
        )
    }

    #[must_use]
    pub fn breaker_status(&self, name: &str) -> Option<BreakerStatus> {
        self.inner.lock().entry(name).map(|e| e.breaker.status())
    }

    /// Append a failure event and mark the component failed.
    pub(crate) fn record_failure(
        &self,
        name: &str,
        failure_type: FailureType,
        message: String,
        severity: Severity,
        now: DateTime<Utc>,
    ) -> RecordedFailure {
        let event = FailureEvent::new(name, failure_type, message, severity, now);
        let mut inner = self.inner.lock();

        inner.history.push_back(event.clone());
        if self.max_history > 0 {
            while inner.history.len() > self.max_history {
                inner.history.pop_front();
            }
        }

        let recovery = inner.entry_mut(name).and_then(|entry| {
            entry.component.status = ComponentStatus::Failed;
            entry.component.health_metrics.consecutive_failures += 1;
            entry.component.health_metrics.last_failure = Some(now);
            entry.recovery.clone()
        });

        RecordedFailure { event, recovery }
    }

    /// Mark the component active and resolve its first unresolved failure.
    ///
    /// Only the oldest unresolved event for `name` is resolved, whichever
    /// failure actually prompted the recovery. Unregistered names change
    /// nothing.
    pub(crate) fn record_recovery(&self, name: &str, now: DateTime<Utc>) {
        let mut inner = self.inner.lock();

        let Some(entry) = inner.entry_mut(name) else {
            return;
        };
        entry.component.status = ComponentStatus::Active;
        entry.component.health_metrics.consecutive_failures = 0;
        entry.component.health_metrics.last_success = Some(now);

        if let Some(event) = inner
            .history
            .iter_mut()
            .find(|e| e.component == name && !e.resolved)
        {
            event.resolve(now);
        }
    }

    /// Record the outcome of a guarded call in the component's metrics.
    pub(crate) fn record_outcome(&self, name: &str, success: bool, now: DateTime<Utc>) {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.entry_mut(name) {
            let metrics = &mut entry.component.health_metrics;
            if success {
                metrics.record_success(now);
            } else {
                metrics.record_failure(now);
            }
        }
    }

    /// Ask the component's breaker whether a call may proceed.
    ///
    /// Returns `None` for an unregistered component.
    pub(crate) fn acquire(&self, name: &str) -> Option<Result<(), CircuitOpenError>> {
        self.inner.lock().entry_mut(name).map(|e| e.breaker.acquire())
    }

    /// Feed a call result back into the component's breaker.
    pub(crate) fn record_call(&self, name: &str, success: bool) {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.entry_mut(name) {
            if success {
                entry.breaker.record_success();
            } else {
                entry.breaker.record_failure();
            }
        }
    }

    /// Components with an attached health check.
    pub(crate) fn health_checks(&self) -> Vec<(String, Arc<dyn HealthCheck>)> {
        self.inner
            .lock()
            .entries
            .iter()
            .filter_map(|e| {
                e.health_check
                    .as_ref()
                    .map(|check| (e.component.name.clone(), Arc::clone(check)))
            })
            .collect()
    }

    pub(crate) fn mark_checked(&self, name: &str, now: DateTime<Utc>) {
        if let Some(entry) = self.inner.lock().entry_mut(name) {
            entry.component.last_check = Some(now);
        }
    }

    /// Count one recovery attempt and, within the cap, move to `Recovering`.
    pub(crate) fn begin_recovery_attempt(&self, name: &str, max_attempts: u32) -> RecoveryAttempt {
        let mut inner = self.inner.lock();
        let Some(entry) = inner.entry_mut(name) else {
            return RecoveryAttempt::Unavailable;
        };
        let Some(recovery) = entry.recovery.clone() else {
            return RecoveryAttempt::Unavailable;
        };

        entry.component.recovery_attempts += 1;
        let attempt = entry.component.recovery_attempts;
        if attempt > max_attempts {
            return RecoveryAttempt::Exhausted { attempts: attempt };
        }

        entry.component.status = ComponentStatus::Recovering;
        RecoveryAttempt::Ready { attempt, recovery }
    }

    pub(crate) fn reset_recovery_attempts(&self, name: &str) {
        if let Some(entry) = self.inner.lock().entry_mut(name) {
            entry.component.recovery_attempts = 0;
        }
    }

    /// Move an active component to standby and count the failover.
    ///
    /// Returns `None` for an unregistered component and `Some(false)` when
    /// the component was not active.
    pub(crate) fn failover(&self, name: &str) -> Option<bool> {
        let mut inner = self.inner.lock();
        let entry = inner.entry_mut(name)?;
        if entry.component.status != ComponentStatus::Active {
            debug!(component = name, status = %entry.component.status, "Failover skipped");
            return Some(false);
        }
        entry.component.status = ComponentStatus::Standby;
        entry.component.failover_count += 1;
        Some(true)
    }
}
