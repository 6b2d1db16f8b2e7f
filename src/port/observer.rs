//! Observer port for failure, recovery and failover events.
//!
//! Observers are best-effort listeners: an error returned from any of their
//! methods is logged by the [`ObserverRegistry`] and never reaches the
//! orchestration control flow.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::failure::FailureEvent;

/// Typed listener, one method per event kind.
///
/// All methods default to doing nothing so implementations only override
/// what they care about. Methods are called inline from the engine and
/// should return quickly; spawn a task for slow work.
pub trait Observer: Send + Sync {
    /// A failure was reported and appended to the history.
    fn on_failure(&self, _event: &FailureEvent) -> anyhow::Result<()> {
        Ok(())
    }

    /// A component was reported recovered.
    fn on_recovery(&self, _component: &str) -> anyhow::Result<()> {
        Ok(())
    }

    /// A manual failover moved `component` out of service toward `target`.
    fn on_failover(&self, _component: &str, _target: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Registry of observers (composite pattern).
///
/// Broadcasts events to every registered observer, logging and discarding
/// their errors.
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    observers: Vec<Arc<dyn Observer>>,
}

impl ObserverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: Arc<dyn Observer>) {
        self.observers.push(observer);
    }

    pub fn notify_failure(&self, event: &FailureEvent) {
        for observer in &self.observers {
            if let Err(e) = observer.on_failure(event) {
                error!(component = %event.component, error = %e, "Error in failure observer");
            }
        }
    }

    pub fn notify_recovery(&self, component: &str) {
        for observer in &self.observers {
            if let Err(e) = observer.on_recovery(component) {
                error!(component, error = %e, "Error in recovery observer");
            }
        }
    }

    pub fn notify_failover(&self, component: &str, target: &str) {
        for observer in &self.observers {
            if let Err(e) = observer.on_failover(component, target) {
                error!(component, target, error = %e, "Error in failover observer");
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

/// An observer that logs events via tracing.
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_failure(&self, event: &FailureEvent) -> anyhow::Result<()> {
        warn!(
            component = %event.component,
            failure_type = %event.failure_type,
            severity = %event.severity,
            message = %event.error_message,
            "Failure reported"
        );
        Ok(())
    }

    fn on_recovery(&self, component: &str) -> anyhow::Result<()> {
        info!(component, "Recovery reported");
        Ok(())
    }

    fn on_failover(&self, component: &str, target: &str) -> anyhow::Result<()> {
        info!(component, target, "Failover reported");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;

    use crate::domain::failure::{FailureType, Severity};

    struct Failing;

    impl Observer for Failing {
        fn on_failure(&self, _event: &FailureEvent) -> anyhow::Result<()> {
            anyhow::bail!("listener exploded")
        }

        fn on_recovery(&self, _component: &str) -> anyhow::Result<()> {
            anyhow::bail!("listener exploded")
        }
    }

    #[derive(Default)]
    struct Counting {
        failures: AtomicUsize,
        recoveries: AtomicUsize,
    }

    impl Observer for Counting {
        fn on_failure(&self, _event: &FailureEvent) -> anyhow::Result<()> {
            self.failures.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn on_recovery(&self, _component: &str) -> anyhow::Result<()> {
            self.recoveries.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn failing_observer_does_not_stop_broadcast() {
        let counting = Arc::new(Counting::default());
        let mut registry = ObserverRegistry::new();
        registry.register(Arc::new(Failing));
        registry.register(counting.clone());

        let event = FailureEvent::new("db", FailureType::Unknown, "x", Severity::Error, Utc::now());
        registry.notify_failure(&event);
        registry.notify_recovery("db");
        registry.notify_failover("db", "backup");

        assert_eq!(counting.failures.load(Ordering::SeqCst), 1);
        assert_eq!(counting.recoveries.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn empty_registry() {
        let registry = ObserverRegistry::default();
        assert!(registry.is_empty());
        registry.notify_recovery("nothing listens");
    }
}
