//! Infrastructure configuration modules.

pub mod breaker;
pub mod logging;
pub mod orchestrator;
pub mod settings;

pub use breaker::BreakerConfig;
pub use logging::LoggingConfig;
pub use orchestrator::OrchestratorConfig;
pub use settings::Config;
