//! Configuration validation command.

use std::path::Path;

use crate::cli::output;
use crate::error::Result;
use crate::infrastructure::Config;

/// Validate a configuration file without starting the orchestrator.
///
/// # Errors
///
/// Returns the load or validation error; the caller maps it to a non-zero
/// exit code.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    output::section(&format!("Checking configuration: {}", path.display()));

    let config = match Config::load(path) {
        Ok(config) => config,
        Err(e) => {
            output::error("Configuration is invalid");
            return Err(e);
        }
    };

    output::ok("Configuration file is valid");
    println!();

    let orchestrator = &config.orchestrator;
    let breaker = &config.breaker;
    output::key_value("Components", config.components.len());
    output::key_value(
        "Health interval",
        format!("{}s", orchestrator.health_check_interval_secs),
    );
    output::key_value("Recovery attempts", orchestrator.max_recovery_attempts);
    output::key_value("Recovery delay", format!("{}s", orchestrator.failover_timeout_secs));
    output::key_value(
        "Breaker",
        format!(
            "{} failures / {}s / {} successes",
            breaker.failure_threshold, breaker.recovery_timeout_secs, breaker.success_threshold
        ),
    );

    if config.components.is_empty() {
        output::warn("No components configured; collaborators must register them at runtime");
    }
    if orchestrator.max_recovery_attempts == 0 {
        output::warn("max_recovery_attempts is 0; automatic recovery is disabled");
    }

    println!();
    Ok(())
}
