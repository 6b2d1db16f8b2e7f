//! Handler for the `status` command.

use std::path::Path;

use tabled::{Table, Tabled};

use crate::application::Orchestrator;
use crate::cli::output;
use crate::domain::health::SystemHealth;
use crate::error::Result;
use crate::infrastructure::Config;

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Failovers")]
    failovers: u32,
}

/// Print the configured components and the health they start with.
///
/// # Errors
///
/// Fails if the configuration cannot be loaded or JSON serialization fails.
pub fn execute(config_path: &Path, json: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let orchestrator = Orchestrator::new(&config);
    let health = orchestrator.get_system_health();

    if json {
        println!("{}", serde_json::to_string_pretty(&health)?);
    } else {
        print_health(&health);
    }
    Ok(())
}

fn print_health(health: &SystemHealth) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::section("System health");
    output::key_value("Overall", health.overall_status);
    output::key_value("Health score", format!("{:.1}", health.health_score));
    output::key_value(
        "Components",
        format!(
            "{} total, {} active, {} failed",
            health.total_components, health.active_components, health.failed_components
        ),
    );
    output::key_value("Uptime", format!("{:.2}%", health.uptime_percentage));

    if health.component_details.is_empty() {
        println!();
        output::warn("No components configured");
        return;
    }

    output::section("Components");
    let rows: Vec<ComponentRow> = health
        .component_details
        .iter()
        .map(|(name, detail)| ComponentRow {
            name: name.clone(),
            status: detail.status.to_string(),
            score: format!("{:.1}", detail.health_score),
            failovers: detail.failover_count,
        })
        .collect();
    output::table(&Table::new(rows).to_string());
    println!();
}
