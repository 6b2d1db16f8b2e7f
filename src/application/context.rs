//! State shared by the orchestrator and its background tasks.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{error, info};

use super::recovery::RecoveryCoordinator;
use super::registry::ComponentRegistry;
use crate::domain::failure::{FailureEvent, FailureType, Severity};
use crate::infrastructure::config::OrchestratorConfig;
use crate::port::observer::{Observer, ObserverRegistry};

/// Everything the health monitor, recovery chains and guarded calls touch.
///
/// The two report methods are the only producers of failure and recovery
/// state changes outside of guarded-call bookkeeping.
pub(crate) struct OrchestratorContext {
    pub registry: ComponentRegistry,
    pub recovery: RecoveryCoordinator,
    pub config: OrchestratorConfig,
    observers: RwLock<ObserverRegistry>,
}

impl OrchestratorContext {
    pub fn new(registry: ComponentRegistry, config: OrchestratorConfig) -> Self {
        let recovery =
            RecoveryCoordinator::new(config.max_recovery_attempts, config.failover_timeout());
        Self {
            registry,
            recovery,
            config,
            observers: RwLock::new(ObserverRegistry::new()),
        }
    }

    pub fn add_observer(&self, observer: Arc<dyn Observer>) {
        self.observers.write().register(observer);
    }

    /// Observers are cloned out so none is called with the lock held.
    fn observers(&self) -> ObserverRegistry {
        self.observers.read().clone()
    }

    /// Record a failure, notify observers, and start recovery if possible.
    pub fn report_failure(
        self: &Arc<Self>,
        component: &str,
        failure_type: FailureType,
        message: impl Into<String>,
        severity: Severity,
    ) -> FailureEvent {
        let message = message.into();
        let recorded =
            self.registry
                .record_failure(component, failure_type, message, severity, Utc::now());

        self.observers().notify_failure(&recorded.event);

        error!(
            component,
            failure_type = %failure_type,
            severity = %severity,
            message = %recorded.event.error_message,
            "Component failed"
        );

        if recorded.recovery.is_some() {
            self.recovery.schedule(Arc::clone(self), component);
        }

        recorded.event
    }

    /// Mark a component recovered and notify observers.
    pub fn report_recovery(&self, component: &str) {
        self.registry.record_recovery(component, Utc::now());
        self.observers().notify_recovery(component);
        info!(component, "Component recovered");
    }

    /// Notify observers of a completed failover.
    pub fn report_failover(&self, component: &str, target: &str) {
        self.observers().notify_failover(component, target);
        info!(component, target, "Failover triggered");
    }
}
