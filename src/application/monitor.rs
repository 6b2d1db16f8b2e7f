//! Periodic health monitoring.
//!
//! A background task polls every registered health check once per interval
//! and turns the results into failure and recovery reports:
//!
//! | check result | current status | action                         |
//! |--------------|----------------|--------------------------------|
//! | `false`      | `Active`       | report failure (warning)       |
//! | `true`       | `Failed`       | report recovery                |
//! | error/panic  | any            | log, no state change           |
//! | otherwise    |                | nothing                        |

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use super::context::OrchestratorContext;
use crate::domain::component::ComponentStatus;
use crate::domain::failure::{FailureType, Severity};

/// Handle to the health monitoring task.
#[derive(Default)]
pub(crate) struct HealthMonitor {
    handle: Option<JoinHandle<()>>,
}

impl HealthMonitor {
    /// Spawn the monitoring loop. A running loop is left as is.
    pub fn start(&mut self, ctx: Arc<OrchestratorContext>, interval: Duration) {
        if self.is_running() {
            debug!("Health monitor already running");
            return;
        }
        self.handle = Some(tokio::spawn(monitoring_task(ctx, interval)));
        info!(interval_secs = interval.as_secs(), "Health monitor started");
    }

    /// Cancel the monitoring loop.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Health monitor stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

/// Runs health-check cycles forever at a fixed interval.
///
/// The first cycle runs immediately.
async fn monitoring_task(ctx: Arc<OrchestratorContext>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        run_cycle(&ctx).await;
    }
}

/// Poll every attached health check once.
pub(crate) async fn run_cycle(ctx: &Arc<OrchestratorContext>) {
    let checks = ctx.registry.health_checks();
    debug!(checks = checks.len(), "Running health checks");

    for (name, check) in checks {
        let healthy = match AssertUnwindSafe(check.check()).catch_unwind().await {
            Ok(Ok(healthy)) => healthy,
            Ok(Err(e)) => {
                error!(component = %name, error = %e, "Health check errored");
                continue;
            }
            Err(_) => {
                error!(component = %name, "Health check panicked");
                continue;
            }
        };

        ctx.registry.mark_checked(&name, Utc::now());

        match (healthy, ctx.registry.status(&name)) {
            (true, Some(ComponentStatus::Failed)) => ctx.report_recovery(&name),
            (false, Some(ComponentStatus::Active)) => {
                ctx.report_failure(
                    &name,
                    FailureType::Unknown,
                    "Health check failed",
                    Severity::Warning,
                );
            }
            _ => {}
        }
    }
}
