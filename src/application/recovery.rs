//! Bounded automatic recovery.
//!
//! Every failure report for a component with a recovery routine starts a
//! recovery chain: a background task that calls the routine, waits
//! `failover_timeout` after each unsuccessful attempt, and stops on success
//! or once the component's attempt counter passes `max_recovery_attempts`.
//!
//! At most one chain runs per component. A new failure report aborts the
//! in-flight chain before starting its replacement. The attempt counter
//! lives on the component, so a superseding chain continues the count
//! rather than starting over; only a successful recovery resets it.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::context::OrchestratorContext;
use super::registry::RecoveryAttempt;

struct Chain {
    id: u64,
    handle: JoinHandle<()>,
}

/// Tracks the in-flight recovery chain of each component.
pub(crate) struct RecoveryCoordinator {
    max_attempts: u32,
    retry_delay: Duration,
    chains: DashMap<String, Chain>,
    next_id: AtomicU64,
}

impl RecoveryCoordinator {
    pub fn new(max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            max_attempts,
            retry_delay,
            chains: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Start a recovery chain for `component`, superseding any running one.
    ///
    /// Does nothing outside a Tokio runtime.
    pub fn schedule(&self, ctx: Arc<OrchestratorContext>, component: &str) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(component, "No async runtime available, recovery not scheduled");
            return;
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let name = component.to_string();

        match self.chains.entry(name.clone()) {
            Entry::Occupied(mut occupied) => {
                let previous = occupied.get();
                if !previous.handle.is_finished() {
                    debug!(component, chain = previous.id, "Superseding recovery chain");
                    previous.handle.abort();
                }
                let handle = runtime.spawn(recovery_chain(ctx, name, id));
                occupied.insert(Chain { id, handle });
            }
            Entry::Vacant(vacant) => {
                let handle = runtime.spawn(recovery_chain(ctx, name, id));
                vacant.insert(Chain { id, handle });
            }
        }
    }

    /// Number of chains still running.
    pub fn active(&self) -> usize {
        self.chains
            .iter()
            .filter(|chain| !chain.handle.is_finished())
            .count()
    }

    /// True if `component` has a running chain.
    pub fn is_recovering(&self, component: &str) -> bool {
        self.chains
            .get(component)
            .is_some_and(|chain| !chain.handle.is_finished())
    }

    /// Abort every in-flight chain.
    pub fn cancel_all(&self) {
        for chain in self.chains.iter() {
            chain.handle.abort();
        }
        self.chains.clear();
    }

    /// Drop the bookkeeping for a chain that ended on its own.
    fn finish(&self, component: &str, id: u64) {
        self.chains.remove_if(component, |_, chain| chain.id == id);
    }
}

/// Body of one recovery chain.
async fn recovery_chain(ctx: Arc<OrchestratorContext>, component: String, id: u64) {
    let max_attempts = ctx.recovery.max_attempts;
    let retry_delay = ctx.recovery.retry_delay;

    loop {
        let (attempt, recovery) = match ctx
            .registry
            .begin_recovery_attempt(&component, max_attempts)
        {
            RecoveryAttempt::Ready { attempt, recovery } => (attempt, recovery),
            RecoveryAttempt::Exhausted { attempts } => {
                warn!(
                    component = %component,
                    attempts,
                    max_attempts,
                    "Max recovery attempts reached, giving up"
                );
                break;
            }
            RecoveryAttempt::Unavailable => break,
        };

        info!(component = %component, attempt, "Attempting recovery");

        match AssertUnwindSafe(recovery.recover()).catch_unwind().await {
            Ok(Ok(true)) => {
                ctx.report_recovery(&component);
                ctx.registry.reset_recovery_attempts(&component);
                break;
            }
            Ok(Ok(false)) => {
                warn!(component = %component, attempt, "Recovery attempt unsuccessful");
            }
            Ok(Err(e)) => {
                error!(component = %component, attempt, error = %e, "Recovery failed");
            }
            Err(_) => {
                error!(component = %component, attempt, "Recovery routine panicked");
            }
        }

        debug!(
            component = %component,
            delay_secs = retry_delay.as_secs(),
            "Retrying recovery after delay"
        );
        tokio::time::sleep(retry_delay).await;
    }

    ctx.recovery.finish(&component, id);
}
