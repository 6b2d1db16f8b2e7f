//! Ports: the contracts the engine expects from its collaborators.

pub mod observer;
pub mod probe;

pub use observer::{LogObserver, Observer, ObserverRegistry};
pub use probe::{health_check_fn, operation, recovery_fn, HealthCheck, Operation, Recovery};
