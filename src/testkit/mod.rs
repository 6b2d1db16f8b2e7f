//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`probe`] - Scripted [`HealthCheck`](crate::port::HealthCheck) and
//!   [`Recovery`](crate::port::Recovery) implementations with call counters.
//! - [`observer`] - [`RecordingObserver`](observer::RecordingObserver), which
//!   keeps every event it is told about.
//! - [`config`] - Canonical test configurations.

pub mod config;
pub mod observer;
pub mod probe;
