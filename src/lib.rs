//! Bulwark - in-process resilience orchestration.
//!
//! Tracks the health of a set of named components, gates calls to them
//! through per-component circuit breakers, runs bounded automatic recovery,
//! executes operations with ordered fallback chains, and derives health and
//! uptime metrics from the failure history.
//!
//! # Architecture
//!
//! - **`domain`** - Pure value types and the circuit breaker state machine
//! - **`port`** - Collaborator contracts: health checks, recovery routines,
//!   fallible operations and observers
//! - **`application`** - The engine: registry, health monitor, recovery
//!   coordinator, execution guard and metrics, behind [`application::Orchestrator`]
//! - **`infrastructure`** - TOML configuration and logging setup
//! - **`cli`** - The `bulwark` binary's commands
//!
//! # Example
//!
//! ```no_run
//! use bulwark::application::Orchestrator;
//! use bulwark::domain::{FailureType, Severity};
//! use bulwark::infrastructure::Config;
//! use bulwark::port::recovery_fn;
//!
//! # async fn demo() {
//! let mut orchestrator = Orchestrator::new(&Config::default());
//! orchestrator.register_component("exchange_api", None, Some(recovery_fn(|| async { Ok(true) })));
//! orchestrator.start();
//!
//! orchestrator.report_component_failure(
//!     "exchange_api",
//!     FailureType::NetworkError,
//!     "connection reset",
//!     Severity::Error,
//! );
//!
//! let health = orchestrator.get_system_health();
//! println!("{} ({:.0})", health.overall_status, health.health_score);
//! # }
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
