//! Guarded execution with ordered fallbacks.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::context::OrchestratorContext;
use crate::domain::failure::{FailureType, Severity};
use crate::error::CallError;
use crate::port::probe::Operation;

/// Runs operations through a component's circuit breaker, falling back to
/// alternatives when the primary fails.
///
/// Cheap to clone; every clone shares the orchestrator's registry.
#[derive(Clone)]
pub struct ExecutionGuard {
    ctx: Arc<OrchestratorContext>,
}

impl ExecutionGuard {
    pub(crate) fn new(ctx: Arc<OrchestratorContext>) -> Self {
        Self { ctx }
    }

    /// Run `primary` through `component`'s breaker, then `fallbacks` in order.
    ///
    /// Fallbacks run unguarded, once each. The first success, primary or
    /// fallback, is recorded as a success for `component` and returned.
    /// When everything fails, a failure is reported for `component` and the
    /// primary's error is returned; fallback errors are only logged.
    ///
    /// An unregistered `component` runs `primary` alone, without breaker or
    /// bookkeeping.
    ///
    /// # Errors
    ///
    /// [`CallError::CircuitOpen`] if the breaker rejected the primary, or
    /// [`CallError::Failed`] with the primary's own error.
    pub async fn execute_with_fallback<'a, T, E, F, Fut>(
        &self,
        component: &str,
        primary: F,
        fallbacks: impl IntoIterator<Item = Operation<'a, T, E>>,
    ) -> Result<T, CallError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let registry = &self.ctx.registry;

        let Some(admission) = registry.acquire(component) else {
            debug!(component, "Component not registered, running unguarded");
            return primary().await.map_err(CallError::Failed);
        };

        let primary_error = match admission {
            Err(open) => CallError::CircuitOpen(open),
            Ok(()) => match primary().await {
                Ok(value) => {
                    registry.record_call(component, true);
                    registry.record_outcome(component, true, Utc::now());
                    return Ok(value);
                }
                Err(err) => {
                    registry.record_call(component, false);
                    CallError::Failed(err)
                }
            },
        };

        warn!(component, error = %primary_error, "Primary operation failed");

        for (i, fallback) in fallbacks.into_iter().enumerate() {
            let n = i + 1;
            info!(component, fallback = n, "Trying fallback");
            match fallback().await {
                Ok(value) => {
                    registry.record_outcome(component, true, Utc::now());
                    return Ok(value);
                }
                Err(err) => warn!(component, fallback = n, error = %err, "Fallback failed"),
            }
        }

        self.ctx.report_failure(
            component,
            FailureType::Unknown,
            format!("All functions failed: {primary_error}"),
            Severity::Error,
        );
        registry.record_outcome(component, false, Utc::now());

        Err(primary_error)
    }
}
