use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn bulwark() -> Command {
    Command::cargo_bin("bulwark").unwrap()
}

#[test]
fn help_lists_commands() {
    bulwark()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn check_config_accepts_valid_file() {
    let file = config_file("components = [\"exchange_api\"]\n");

    bulwark()
        .args(["check", "config", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"));
}

#[test]
fn check_config_rejects_invalid_file() {
    let file = config_file("[orchestrator]\nhealth_check_interval_secs = 0\n");

    bulwark()
        .args(["check", "config", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("health_check_interval_secs"));
}

#[test]
fn check_config_reports_missing_file() {
    bulwark()
        .args(["check", "config", "--config", "/nonexistent/bulwark.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn status_prints_json() {
    let file = config_file("components = [\"exchange_api\", \"data_cache\"]\n");

    bulwark()
        .args(["status", "--json", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"overall_status\": \"healthy\""))
        .stdout(predicate::str::contains("\"exchange_api\""))
        .stdout(predicate::str::contains("\"total_components\": 2"));
}

#[test]
fn status_prints_table() {
    let file = config_file("components = [\"exchange_api\"]\n");

    bulwark()
        .args(["status", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Component"))
        .stdout(predicate::str::contains("exchange_api"))
        .stdout(predicate::str::contains("standby"));
}
