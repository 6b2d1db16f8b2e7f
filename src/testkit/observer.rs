//! Observer that records every event for assertions.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::failure::FailureEvent;
use crate::port::observer::Observer;

/// One event seen by a [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Failure(FailureEvent),
    Recovery(String),
    Failover { component: String, target: String },
}

/// Thread-safe event collector. Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<Recorded>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Recorded> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn failures(&self) -> Vec<FailureEvent> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Recorded::Failure(event) => Some(event.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn recoveries(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Recorded::Recovery(component) => Some(component.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn failovers(&self) -> Vec<(String, String)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Recorded::Failover { component, target } => {
                    Some((component.clone(), target.clone()))
                }
                _ => None,
            })
            .collect()
    }
}

impl Observer for RecordingObserver {
    fn on_failure(&self, event: &FailureEvent) -> anyhow::Result<()> {
        self.events.lock().push(Recorded::Failure(event.clone()));
        Ok(())
    }

    fn on_recovery(&self, component: &str) -> anyhow::Result<()> {
        self.events
            .lock()
            .push(Recorded::Recovery(component.to_string()));
        Ok(())
    }

    fn on_failover(&self, component: &str, target: &str) -> anyhow::Result<()> {
        self.events.lock().push(Recorded::Failover {
            component: component.to_string(),
            target: target.to_string(),
        });
        Ok(())
    }
}
