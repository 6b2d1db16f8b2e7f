//! Derived health and uptime metrics.
//!
//! Pure computations over registry snapshots. Nothing here mutates state,
//! and every function takes `now` explicitly.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::component::{Component, ComponentStatus};
use crate::domain::failure::FailureEvent;
use crate::domain::health::{ComponentHealth, FailureReport, SystemHealth, SystemStatus};

/// Seconds without a success before the staleness penalty applies.
const STALE_AFTER_SECS: f64 = 300.0;
/// Cap on the staleness penalty.
const MAX_STALE_PENALTY: f64 = 20.0;
/// Penalty per consecutive failure, and its cap.
const FAILURE_PENALTY: f64 = 10.0;
const MAX_FAILURE_PENALTY: f64 = 50.0;

fn secs_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 1000.0
}

/// Computes system-wide and per-component health from snapshots.
#[derive(Debug, Clone, Copy)]
pub struct MetricsAggregator {
    recent_window: Duration,
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}

impl MetricsAggregator {
    /// `recent_window` bounds what counts as a recent failure.
    #[must_use]
    pub fn new(recent_window: Duration) -> Self {
        Self { recent_window }
    }

    /// Aggregate health across all components.
    #[must_use]
    pub fn system_health(
        &self,
        components: &[Component],
        history: &[FailureEvent],
        now: DateTime<Utc>,
    ) -> SystemHealth {
        let total = components.len();
        let active = components
            .iter()
            .filter(|c| c.status == ComponentStatus::Active)
            .count();
        let failed = components
            .iter()
            .filter(|c| c.status == ComponentStatus::Failed)
            .count();

        let health_score = if total > 0 {
            active as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        let overall_status = if failed == 0 {
            SystemStatus::Healthy
        } else if failed as f64 / total as f64 > 0.5 {
            SystemStatus::Critical
        } else {
            SystemStatus::Degraded
        };

        let window_secs = self.recent_window.as_secs_f64();
        let recent_failures = history
            .iter()
            .filter(|e| secs_between(e.timestamp, now) < window_secs)
            .count();

        let component_details = components
            .iter()
            .map(|c| {
                (
                    c.name.clone(),
                    ComponentHealth {
                        status: c.status,
                        health_score: component_health_score(c, now),
                        last_check: c.last_check,
                        failover_count: c.failover_count,
                    },
                )
            })
            .collect();

        SystemHealth {
            overall_status,
            health_score,
            total_components: total,
            active_components: active,
            failed_components: failed,
            recent_failures,
            uptime_percentage: uptime_percentage(history, now),
            component_details,
        }
    }
}

/// Share of time since the first recorded failure not spent in downtime.
///
/// All components share one downtime timeline: an unresolved failure opens
/// a window if none is open, and the next resolved failure (in timestamp
/// order) closes it at its resolution time. Overlapping failures in
/// different components are therefore not counted twice.
#[must_use]
pub fn uptime_percentage(history: &[FailureEvent], now: DateTime<Utc>) -> f64 {
    let Some(first) = history.iter().map(|e| e.timestamp).min() else {
        return 100.0;
    };

    let total_time = secs_between(first, now);
    if total_time <= 0.0 {
        return 100.0;
    }

    let mut ordered: Vec<&FailureEvent> = history.iter().collect();
    ordered.sort_by_key(|e| e.timestamp);

    let mut downtime = 0.0;
    let mut window_start: Option<DateTime<Utc>> = None;

    for event in ordered {
        match (event.resolved, window_start) {
            (false, None) => window_start = Some(event.timestamp),
            (true, Some(start)) => {
                if let Some(resolved_at) = event.resolution_time {
                    downtime += secs_between(start, resolved_at);
                }
                window_start = None;
            }
            _ => {}
        }
    }

    ((total_time - downtime) / total_time * 100.0).clamp(0.0, 100.0)
}

/// 0–100 score from success rate, consecutive failures and staleness.
///
/// A component that has never served a guarded request scores 100 if it is
/// active and 0 otherwise.
#[must_use]
pub fn component_health_score(component: &Component, now: DateTime<Utc>) -> f64 {
    let metrics = &component.health_metrics;

    if metrics.total_requests == 0 {
        return if component.status == ComponentStatus::Active {
            100.0
        } else {
            0.0
        };
    }

    let mut score = metrics.success_rate * 100.0;
    score -= (f64::from(metrics.consecutive_failures) * FAILURE_PENALTY).min(MAX_FAILURE_PENALTY);

    if let Some(last_success) = metrics.last_success {
        let since = secs_between(last_success, now);
        if since > STALE_AFTER_SECS {
            score -= (since / 60.0).min(MAX_STALE_PENALTY);
        }
    }

    score.clamp(0.0, 100.0)
}

/// Summarize failures recorded in the last `hours` hours.
///
/// A window reaching past the representable date range covers the whole
/// history.
#[must_use]
pub fn failure_report(history: &[FailureEvent], hours: u32, now: DateTime<Utc>) -> FailureReport {
    let cutoff = now.checked_sub_signed(chrono::Duration::hours(i64::from(hours)));
    let recent: Vec<&FailureEvent> = history
        .iter()
        .filter(|e| cutoff.map_or(true, |cutoff| e.timestamp >= cutoff))
        .collect();

    let mut failures_by_type = BTreeMap::new();
    let mut failures_by_component = BTreeMap::new();
    for event in &recent {
        *failures_by_type.entry(event.failure_type).or_insert(0) += 1;
        *failures_by_component
            .entry(event.component.clone())
            .or_insert(0) += 1;
    }

    let resolution_times: Vec<f64> = recent.iter().filter_map(|e| e.resolution_secs()).collect();
    let average_resolution_time = if resolution_times.is_empty() {
        None
    } else {
        Some(resolution_times.iter().sum::<f64>() / resolution_times.len() as f64)
    };

    FailureReport {
        window_hours: hours,
        total_failures: recent.len(),
        failures_by_type,
        failures_by_component,
        unresolved_failures: recent.iter().filter(|e| !e.resolved).count(),
        average_resolution_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    use crate::domain::failure::{FailureType, Severity};

    fn at(base: DateTime<Utc>, secs: i64) -> DateTime<Utc> {
        base + ChronoDuration::seconds(secs)
    }

    fn event(component: &str, timestamp: DateTime<Utc>) -> FailureEvent {
        FailureEvent::new(
            component,
            FailureType::NetworkError,
            "down",
            Severity::Error,
            timestamp,
        )
    }

    fn component(name: &str, status: ComponentStatus) -> Component {
        let mut c = Component::new(name);
        c.status = status;
        c
    }

    #[test]
    fn uptime_is_full_without_history() {
        assert_eq!(uptime_percentage(&[], Utc::now()), 100.0);
    }

    #[test]
    fn uptime_subtracts_resolved_downtime() {
        let base = Utc::now();
        let opened = event("db", at(base, 0));
        let mut closed = event("db", at(base, 10));
        closed.resolve(at(base, 25));

        // Window opens at 0, closes at 25: 25s down over 100s.
        let uptime = uptime_percentage(&[opened, closed], at(base, 100));
        assert!((uptime - 75.0).abs() < 1e-9, "uptime was {uptime}");
    }

    #[test]
    fn uptime_ignores_open_window() {
        let base = Utc::now();
        let history = vec![event("db", at(base, 0))];

        assert_eq!(uptime_percentage(&history, at(base, 60)), 100.0);
    }

    #[test]
    fn uptime_shares_one_timeline_across_components() {
        let base = Utc::now();
        let db = event("db", at(base, 0));
        let cache = event("cache", at(base, 5));
        let mut resolved = event("api", at(base, 10));
        resolved.resolve(at(base, 50));

        // The cache failure lands inside the open db window and adds nothing.
        let uptime = uptime_percentage(&[cache, resolved, db], at(base, 100));
        assert!((uptime - 50.0).abs() < 1e-9, "uptime was {uptime}");
    }

    #[test]
    fn score_without_requests_depends_on_status() {
        let now = Utc::now();
        assert_eq!(component_health_score(&component("a", ComponentStatus::Active), now), 100.0);
        assert_eq!(component_health_score(&component("b", ComponentStatus::Standby), now), 0.0);
    }

    #[test]
    fn score_penalizes_consecutive_failures() {
        let now = Utc::now();
        let mut c = component("db", ComponentStatus::Active);
        for _ in 0..8 {
            c.health_metrics.record_success(now);
        }
        c.health_metrics.record_failure(now);
        c.health_metrics.record_failure(now);

        // 80% success rate minus 2 * 10.
        let score = component_health_score(&c, now);
        assert!((score - 60.0).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn failure_penalty_is_capped() {
        let now = Utc::now();
        let mut c = component("db", ComponentStatus::Failed);
        c.health_metrics.record_success(now);
        c.health_metrics.total_requests = 1;
        c.health_metrics.consecutive_failures = 9;

        // 100 - min(90, 50)
        assert_eq!(component_health_score(&c, now), 50.0);
    }

    #[test]
    fn score_penalizes_stale_success() {
        let base = Utc::now();
        let mut c = component("db", ComponentStatus::Active);
        c.health_metrics.record_success(base);

        assert_eq!(component_health_score(&c, at(base, 300)), 100.0);
        let ten_minutes = component_health_score(&c, at(base, 600));
        assert!((ten_minutes - 90.0).abs() < 1e-9);
        assert_eq!(component_health_score(&c, at(base, 7200)), 80.0);
    }

    #[test]
    fn system_status_thresholds() {
        let aggregator = MetricsAggregator::default();
        let now = Utc::now();

        let healthy = vec![
            component("a", ComponentStatus::Active),
            component("b", ComponentStatus::Standby),
        ];
        let health = aggregator.system_health(&healthy, &[], now);
        assert_eq!(health.overall_status, SystemStatus::Healthy);
        assert_eq!(health.health_score, 50.0);

        let degraded = vec![
            component("a", ComponentStatus::Active),
            component("b", ComponentStatus::Failed),
        ];
        let health = aggregator.system_health(&degraded, &[], now);
        assert_eq!(health.overall_status, SystemStatus::Degraded);

        let critical = vec![
            component("a", ComponentStatus::Failed),
            component("b", ComponentStatus::Failed),
            component("c", ComponentStatus::Active),
        ];
        let health = aggregator.system_health(&critical, &[], now);
        assert_eq!(health.overall_status, SystemStatus::Critical);
        assert_eq!(health.failed_components, 2);
        assert_eq!(health.active_components, 1);
    }

    #[test]
    fn empty_system_is_healthy_with_zero_score() {
        let health = MetricsAggregator::default().system_health(&[], &[], Utc::now());
        assert_eq!(health.overall_status, SystemStatus::Healthy);
        assert_eq!(health.health_score, 0.0);
        assert_eq!(health.uptime_percentage, 100.0);
    }

    #[test]
    fn recent_failures_respect_window() {
        let now = Utc::now();
        let history = vec![event("db", at(now, -7200)), event("db", at(now, -60))];

        let health = MetricsAggregator::default().system_health(&[], &history, now);
        assert_eq!(health.recent_failures, 1);
    }

    #[test]
    fn failure_report_groups_and_averages() {
        let now = Utc::now();
        let mut first = event("db", at(now, -600));
        first.resolve(at(now, -540));
        let mut second = event("cache", at(now, -300));
        second.failure_type = FailureType::Timeout;
        second.resolve(at(now, -180));
        let open = event("db", at(now, -60));
        let old = event("db", at(now, -90_000));

        let report = failure_report(&[old, first, second, open], 24, now);

        assert_eq!(report.total_failures, 3);
        assert_eq!(report.unresolved_failures, 1);
        assert_eq!(report.failures_by_component["db"], 2);
        assert_eq!(report.failures_by_component["cache"], 1);
        assert_eq!(report.failures_by_type[&FailureType::NetworkError], 2);
        assert_eq!(report.failures_by_type[&FailureType::Timeout], 1);
        assert_eq!(report.average_resolution_time, Some(90.0));
    }

    #[test]
    fn failure_report_without_resolutions_has_no_average() {
        let now = Utc::now();
        let report = failure_report(&[event("db", now)], 1, now);
        assert_eq!(report.average_resolution_time, None);
        assert_eq!(report.window_hours, 1);
    }

    #[test]
    fn failure_report_with_unbounded_window_covers_everything() {
        let now = Utc::now();
        let history = vec![event("db", at(now, -90_000)), event("cache", now)];

        let report = failure_report(&history, u32::MAX, now);
        assert_eq!(report.total_failures, 2);
        assert_eq!(report.window_hours, u32::MAX);
    }
}
