//! The resilience orchestrator.
//!
//! [`Orchestrator`] is the public face of the engine. It owns the component
//! registry, the health monitor and the recovery coordinator, and exposes
//! the operations collaborators call: registering components, reporting
//! failures and recoveries, guarded execution, manual failover, and health
//! reporting.
//!
//! # Example
//!
//! ```no_run
//! use bulwark::application::Orchestrator;
//! use bulwark::infrastructure::Config;
//! use bulwark::port::{health_check_fn, operation};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let mut orchestrator = Orchestrator::new(&Config::default());
//! orchestrator.register_component("db", Some(health_check_fn(|| async { Ok(true) })), None);
//! orchestrator.start();
//!
//! let rows: u32 = orchestrator
//!     .execute_with_fallback(
//!         "db",
//!         || async { Err::<u32, String>("primary down".into()) },
//!         [operation(|| async { Ok(0) })],
//!     )
//!     .await?;
//! assert_eq!(rows, 0);
//!
//! orchestrator.shutdown();
//! # Ok(())
//! # }
//! ```

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::context::OrchestratorContext;
use super::guard::ExecutionGuard;
use super::metrics::{self, MetricsAggregator};
use super::monitor::{self, HealthMonitor};
use super::registry::ComponentRegistry;
use crate::domain::breaker::{BreakerSettings, BreakerStatus};
use crate::domain::component::Component;
use crate::domain::failure::{FailureEvent, FailureType, Severity};
use crate::domain::health::{FailureReport, SystemHealth};
use crate::error::{CallError, Error, Result};
use crate::infrastructure::config::{Config, OrchestratorConfig};
use crate::port::observer::Observer;
use crate::port::probe::{HealthCheck, Operation, Recovery};

/// Default failover target when none is given.
const DEFAULT_FAILOVER_TARGET: &str = "backup";

/// Central coordinator for component health, recovery and failover.
pub struct Orchestrator {
    ctx: Arc<OrchestratorContext>,
    monitor: HealthMonitor,
    metrics: MetricsAggregator,
}

impl Orchestrator {
    /// Build an orchestrator from configuration, pre-registering
    /// `config.components`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let orchestrator =
            Self::with_settings(config.orchestrator.clone(), config.breaker.settings());
        for name in &config.components {
            orchestrator.register_component(name, None, None);
        }
        orchestrator
    }

    /// Build an empty orchestrator with explicit settings.
    #[must_use]
    pub fn with_settings(config: OrchestratorConfig, breaker: BreakerSettings) -> Self {
        let registry = ComponentRegistry::new(breaker, config.max_failure_history);
        let metrics = MetricsAggregator::new(config.recent_failure_window());
        Self {
            ctx: Arc::new(OrchestratorContext::new(registry, config)),
            monitor: HealthMonitor::default(),
            metrics,
        }
    }

    /// Subscribe an observer to failure, recovery and failover events.
    pub fn add_observer(&self, observer: Arc<dyn Observer>) {
        self.ctx.add_observer(observer);
    }

    /// Register a component, or attach callables to an existing one.
    ///
    /// Returns `true` if the component was newly created.
    pub fn register_component(
        &self,
        name: &str,
        health_check: Option<Arc<dyn HealthCheck>>,
        recovery: Option<Arc<dyn Recovery>>,
    ) -> bool {
        let created = self.ctx.registry.register(name, health_check, recovery);
        if created {
            info!(component = name, "Registered component");
        }
        created
    }

    /// Record a component failure.
    ///
    /// The component moves to `Failed` and, if it has a recovery routine,
    /// a recovery chain starts in the background, replacing any chain
    /// already running for it. Failures for unregistered names are kept in
    /// the history but change no component.
    pub fn report_component_failure(
        &self,
        component: &str,
        failure_type: FailureType,
        message: impl Into<String>,
        severity: Severity,
    ) -> FailureEvent {
        self.ctx
            .report_failure(component, failure_type, message, severity)
    }

    /// Mark a component recovered and resolve its oldest open failure.
    ///
    /// Unregistered names are ignored.
    pub fn report_component_recovery(&self, component: &str) {
        self.ctx.report_recovery(component);
    }

    /// See [`ExecutionGuard::execute_with_fallback`].
    ///
    /// # Errors
    ///
    /// [`CallError::CircuitOpen`] if the breaker rejected the primary, or
    /// [`CallError::Failed`] with the primary's error once every fallback
    /// has failed too.
    pub async fn execute_with_fallback<'a, T, E, F, Fut>(
        &self,
        component: &str,
        primary: F,
        fallbacks: impl IntoIterator<Item = Operation<'a, T, E>>,
    ) -> std::result::Result<T, CallError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Display,
    {
        self.guard()
            .execute_with_fallback(component, primary, fallbacks)
            .await
    }

    /// A cloneable handle for guarded execution from other tasks.
    #[must_use]
    pub fn guard(&self) -> ExecutionGuard {
        ExecutionGuard::new(Arc::clone(&self.ctx))
    }

    /// Manually fail a component over to `target` (default `"backup"`).
    ///
    /// An active component moves to `Standby` and observers are told.
    /// Returns `false` without side effects if the component was not active.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownComponent`] if `component` is not registered.
    pub fn trigger_failover(&self, component: &str, target: Option<&str>) -> Result<bool> {
        let moved = self
            .ctx
            .registry
            .failover(component)
            .ok_or_else(|| Error::UnknownComponent(component.to_string()))?;

        if moved {
            self.ctx
                .report_failover(component, target.unwrap_or(DEFAULT_FAILOVER_TARGET));
        }
        Ok(moved)
    }

    /// Aggregate health of every registered component.
    #[must_use]
    pub fn get_system_health(&self) -> SystemHealth {
        let (components, history) = self.ctx.registry.snapshot();
        self.metrics
            .system_health(&components, &history, Utc::now())
    }

    /// Failures recorded in the last `hours` hours.
    #[must_use]
    pub fn get_failure_report(&self, hours: u32) -> FailureReport {
        metrics::failure_report(&self.ctx.registry.history(), hours, Utc::now())
    }

    #[must_use]
    pub fn uptime_percentage(&self) -> f64 {
        metrics::uptime_percentage(&self.ctx.registry.history(), Utc::now())
    }

    /// Health score of one component, `None` if it is not registered.
    #[must_use]
    pub fn component_health_score(&self, component: &str) -> Option<f64> {
        self.ctx
            .registry
            .component(component)
            .map(|c| metrics::component_health_score(&c, Utc::now()))
    }

    #[must_use]
    pub fn component(&self, name: &str) -> Option<Component> {
        self.ctx.registry.component(name)
    }

    #[must_use]
    pub fn components(&self) -> Vec<Component> {
        self.ctx.registry.components()
    }

    #[must_use]
    pub fn failure_history(&self) -> Vec<FailureEvent> {
        self.ctx.registry.history()
    }

    #[must_use]
    pub fn breaker_status(&self, component: &str) -> Option<BreakerStatus> {
        self.ctx.registry.breaker_status(component)
    }

    /// Start the background health monitor.
    ///
    /// Must be called from within a Tokio runtime. Calling it again while
    /// the monitor runs has no effect.
    pub fn start(&mut self) {
        let interval = self.ctx.config.health_check_interval();
        self.monitor.start(Arc::clone(&self.ctx), interval);
    }

    /// Stop the health monitor. Recovery chains keep running.
    pub fn stop(&mut self) {
        self.monitor.stop();
    }

    #[must_use]
    pub fn is_monitoring(&self) -> bool {
        self.monitor.is_running()
    }

    /// Run one health-check cycle immediately, outside the monitor loop.
    pub async fn run_health_checks(&self) {
        monitor::run_cycle(&self.ctx).await;
    }

    /// Number of recovery chains currently running.
    #[must_use]
    pub fn active_recoveries(&self) -> usize {
        self.ctx.recovery.active()
    }

    #[must_use]
    pub fn is_recovering(&self, component: &str) -> bool {
        self.ctx.recovery.is_recovering(component)
    }

    /// Stop the monitor and abort every in-flight recovery chain.
    pub fn shutdown(&mut self) {
        self.monitor.stop();
        self.ctx.recovery.cancel_all();
        info!("Orchestrator shut down");
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.stop();
    }
}
