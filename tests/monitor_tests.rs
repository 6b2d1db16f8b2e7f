//! Health monitor cycles and their effect on component state.

use std::sync::Arc;
use std::time::Duration;

use bulwark::application::Orchestrator;
use bulwark::domain::{ComponentStatus, FailureType, Severity};
use bulwark::testkit::config;
use bulwark::testkit::observer::RecordingObserver;
use bulwark::testkit::probe::{ScriptedHealthCheck, ScriptedRecovery, Step};

fn orchestrator(interval_secs: u64) -> Orchestrator {
    Orchestrator::with_settings(
        config::orchestrator(interval_secs, 3, 60),
        config::breaker(5, 60, 3),
    )
}

#[tokio::test]
async fn failing_check_fails_active_component() {
    let orchestrator = orchestrator(30);
    let observer = RecordingObserver::new();
    orchestrator.add_observer(Arc::new(observer.clone()));
    let check = ScriptedHealthCheck::new(false);
    orchestrator.register_component("exchange_api", Some(check.shared()), None);
    orchestrator.report_component_recovery("exchange_api");

    orchestrator.run_health_checks().await;

    let component = orchestrator.component("exchange_api").unwrap();
    assert_eq!(component.status, ComponentStatus::Failed);
    assert!(component.last_check.is_some());

    let failures = observer.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].failure_type, FailureType::Unknown);
    assert_eq!(failures[0].severity, Severity::Warning);
    assert_eq!(failures[0].error_message, "Health check failed");
}

#[tokio::test]
async fn passing_check_recovers_failed_component() {
    let orchestrator = orchestrator(30);
    let check = ScriptedHealthCheck::new(true);
    orchestrator.register_component("cache", Some(check.shared()), None);
    orchestrator.report_component_failure(
        "cache",
        FailureType::ResourceExhaustion,
        "out of memory",
        Severity::Critical,
    );

    orchestrator.run_health_checks().await;

    assert_eq!(
        orchestrator.component("cache").unwrap().status,
        ComponentStatus::Active
    );
    assert!(orchestrator.failure_history()[0].resolved);
}

#[tokio::test]
async fn standby_components_are_left_alone() {
    let orchestrator = orchestrator(30);
    let check = ScriptedHealthCheck::new(false);
    orchestrator.register_component("replica", Some(check.shared()), None);

    orchestrator.run_health_checks().await;

    assert_eq!(check.calls(), 1);
    let replica = orchestrator.component("replica").unwrap();
    assert_eq!(replica.status, ComponentStatus::Standby);
    assert!(replica.last_check.is_some());
    assert!(orchestrator.failure_history().is_empty());
}

#[tokio::test]
async fn erroring_and_panicking_checks_give_no_signal() {
    let orchestrator = orchestrator(30);
    let erroring = ScriptedHealthCheck::new(false).then([Step::Fail("timeout".into())]);
    let panicking = ScriptedHealthCheck::new(false).then([Step::Panic]);
    let failing = ScriptedHealthCheck::new(false);
    orchestrator.register_component("a", Some(erroring.shared()), None);
    orchestrator.register_component("b", Some(panicking.shared()), None);
    orchestrator.register_component("c", Some(failing.shared()), None);
    for name in ["a", "b", "c"] {
        orchestrator.report_component_recovery(name);
    }

    orchestrator.run_health_checks().await;

    for name in ["a", "b"] {
        let component = orchestrator.component(name).unwrap();
        assert_eq!(component.status, ComponentStatus::Active, "{name}");
        assert!(component.last_check.is_none(), "{name}");
    }
    // The cycle kept going past the bad checks.
    assert_eq!(
        orchestrator.component("c").unwrap().status,
        ComponentStatus::Failed
    );
}

#[tokio::test(start_paused = true)]
async fn monitor_runs_every_interval() {
    let mut orchestrator = orchestrator(10);
    let check = ScriptedHealthCheck::new(true);
    orchestrator.register_component("api", Some(check.shared()), None);

    orchestrator.start();
    tokio::time::sleep(Duration::from_secs(25)).await;

    // Immediate first cycle, then at 10s and 20s.
    assert_eq!(check.calls(), 3);

    orchestrator.stop();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(check.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn monitor_detects_failure_and_recovery_follows() {
    let mut orchestrator = orchestrator(10);
    let check = ScriptedHealthCheck::new(true).then([Step::Return(false)]);
    let recovery = ScriptedRecovery::new(true);
    orchestrator.register_component("stream", Some(check.shared()), Some(recovery.shared()));
    orchestrator.report_component_recovery("stream");

    orchestrator.start();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(recovery.calls(), 1);
    assert_eq!(
        orchestrator.component("stream").unwrap().status,
        ComponentStatus::Active
    );
    let history = orchestrator.failure_history();
    assert_eq!(history.len(), 1);
    assert!(history[0].resolved);

    orchestrator.shutdown();
}

#[tokio::test(start_paused = true)]
async fn zero_interval_runs_once_per_second() {
    let mut orchestrator = orchestrator(0);
    let check = ScriptedHealthCheck::new(true);
    orchestrator.register_component("api", Some(check.shared()), None);

    orchestrator.start();
    tokio::time::sleep(Duration::from_millis(2500)).await;

    // Immediate first cycle, then at 1s and 2s.
    assert_eq!(check.calls(), 3);
    orchestrator.stop();
}
