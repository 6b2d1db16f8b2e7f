//! Scripted health checks and recovery routines.
//!
//! Each probe pops its next result from a queue and repeats a fallback once
//! the queue is empty. Call counters are shared across clones, so a test can
//! keep a handle after handing the probe to the orchestrator.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::port::probe::{HealthCheck, Recovery};

/// What a scripted probe does on one call.
#[derive(Debug, Clone)]
pub enum Step {
    Return(bool),
    Fail(String),
    Panic,
}

impl Step {
    fn run(self) -> anyhow::Result<bool> {
        match self {
            Self::Return(value) => Ok(value),
            Self::Fail(message) => Err(anyhow::anyhow!(message)),
            Self::Panic => panic!("scripted probe panic"),
        }
    }
}

#[derive(Debug)]
struct Script {
    steps: Mutex<VecDeque<Step>>,
    fallback: Mutex<Step>,
    calls: AtomicU32,
}

impl Script {
    fn new(fallback: Step) -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(fallback),
            calls: AtomicU32::new(0),
        }
    }

    fn next(&self) -> Step {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.steps.lock().pop_front();
        scripted.unwrap_or_else(|| self.fallback.lock().clone())
    }
}

/// A [`HealthCheck`] driven by a script.
#[derive(Debug, Clone)]
pub struct ScriptedHealthCheck {
    script: Arc<Script>,
}

impl ScriptedHealthCheck {
    /// Always reports `healthy` until scripted otherwise.
    pub fn new(healthy: bool) -> Self {
        Self {
            script: Arc::new(Script::new(Step::Return(healthy))),
        }
    }

    /// Queue steps to run before falling back.
    pub fn then(self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.script.steps.lock().extend(steps);
        self
    }

    /// Change what every later unscripted call returns.
    pub fn set_healthy(&self, healthy: bool) {
        *self.script.fallback.lock() = Step::Return(healthy);
    }

    pub fn calls(&self) -> u32 {
        self.script.calls.load(Ordering::SeqCst)
    }

    pub fn shared(&self) -> Arc<dyn HealthCheck> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl HealthCheck for ScriptedHealthCheck {
    async fn check(&self) -> anyhow::Result<bool> {
        self.script.next().run()
    }
}

/// A [`Recovery`] routine driven by a script.
#[derive(Debug, Clone)]
pub struct ScriptedRecovery {
    script: Arc<Script>,
}

impl ScriptedRecovery {
    /// Always returns `succeeds` until scripted otherwise.
    pub fn new(succeeds: bool) -> Self {
        Self {
            script: Arc::new(Script::new(Step::Return(succeeds))),
        }
    }

    /// Queue steps to run before falling back.
    pub fn then(self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.script.steps.lock().extend(steps);
        self
    }

    pub fn calls(&self) -> u32 {
        self.script.calls.load(Ordering::SeqCst)
    }

    pub fn shared(&self) -> Arc<dyn Recovery> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl Recovery for ScriptedRecovery {
    async fn recover(&self) -> anyhow::Result<bool> {
        self.script.next().run()
    }
}
