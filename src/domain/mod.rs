//! Resilience domain types.
//!
//! Everything here is pure: no I/O, no background tasks. The engine in
//! [`crate::application`] owns the live instances.

pub mod breaker;
pub mod component;
pub mod failure;
pub mod health;

pub use breaker::{BreakerSettings, BreakerStatus, CircuitBreaker, CircuitOpenError, CircuitState};
pub use component::{Component, ComponentStatus, HealthMetrics};
pub use failure::{FailureEvent, FailureType, Severity};
pub use health::{ComponentHealth, FailureReport, SystemHealth, SystemStatus};
