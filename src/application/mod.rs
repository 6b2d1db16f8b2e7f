//! The resilience engine.
//!
//! [`Orchestrator`] ties together the component registry, the periodic
//! health monitor, bounded recovery chains and guarded execution. Metrics
//! are derived on demand from registry snapshots.

mod context;
mod guard;
pub mod metrics;
mod monitor;
mod orchestrator;
mod recovery;
pub mod registry;

pub use guard::ExecutionGuard;
pub use metrics::MetricsAggregator;
pub use orchestrator::Orchestrator;
pub use registry::ComponentRegistry;
