//! Handler for the `run` command.

use std::sync::Arc;

use tokio::signal;
use tracing::info;

use crate::application::Orchestrator;
use crate::cli::RunArgs;
use crate::error::Result;
use crate::infrastructure::Config;
use crate::port::LogObserver;

/// Failure report window printed on shutdown.
const REPORT_WINDOW_HOURS: u32 = 24;

/// Execute the run command.
///
/// Starts the health monitor over the configured components, logs a health
/// summary every interval, and prints the failure report as JSON when
/// interrupted.
///
/// # Errors
///
/// Fails if the configuration cannot be loaded or the report cannot be
/// serialized.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = Config::load(&args.config)?;

    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }

    config.init_logging();

    info!(
        components = ?config.components,
        interval_secs = config.orchestrator.health_check_interval_secs,
        "bulwark starting"
    );

    let mut orchestrator = Orchestrator::new(&config);
    orchestrator.add_observer(Arc::new(LogObserver));
    orchestrator.start();

    let mut ticker = tokio::time::interval(config.orchestrator.health_check_interval());
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let health = orchestrator.get_system_health();
                info!(
                    status = %health.overall_status,
                    score = health.health_score,
                    active = health.active_components,
                    failed = health.failed_components,
                    recent_failures = health.recent_failures,
                    "System health"
                );
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    orchestrator.shutdown();

    let report = orchestrator.get_failure_report(REPORT_WINDOW_HOURS);
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!("bulwark stopped");
    Ok(())
}
