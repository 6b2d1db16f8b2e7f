//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings. Every
//! section is optional in the TOML file and falls back to its defaults.
//!
//! # Example
//!
//! ```no_run
//! use bulwark::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::breaker::BreakerConfig;
use super::logging::LoggingConfig;
use super::orchestrator::OrchestratorConfig;
use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Components registered at startup, before any collaborator attaches
    /// health checks or recovery routines to them.
    #[serde(default)]
    pub components: Vec<String>,

    /// Health monitoring and recovery timing.
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Thresholds for every component's circuit breaker.
    #[serde(default)]
    pub breaker: BreakerConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Check that all values are within acceptable ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first offending field.
    pub fn validate(&self) -> Result<()> {
        let invalid = |field: &'static str, reason: &str| -> crate::error::Error {
            ConfigError::InvalidValue {
                field,
                reason: reason.to_string(),
            }
            .into()
        };

        if self.orchestrator.health_check_interval_secs == 0 {
            return Err(invalid("health_check_interval_secs", "must be greater than 0"));
        }
        if self.orchestrator.recent_failure_window_secs == 0 {
            return Err(invalid("recent_failure_window_secs", "must be greater than 0"));
        }
        if self.breaker.failure_threshold == 0 {
            return Err(invalid("failure_threshold", "must be greater than 0"));
        }
        if self.breaker.success_threshold == 0 {
            return Err(invalid("success_threshold", "must be greater than 0"));
        }
        if self.components.iter().any(|name| name.trim().is_empty()) {
            return Err(invalid("components", "component names must not be empty"));
        }

        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
