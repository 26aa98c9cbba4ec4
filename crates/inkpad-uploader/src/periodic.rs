//! Periodic task registry: an append-only list of named tasks run in
//! registration order on every tick.
//!
//! Tasks must be idempotent; the registry runs them for the session's
//! lifetime with no removal or pause API. A failing task is logged and the
//! remaining tasks in the tick still run; the failed task runs again on the
//! next tick.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::MissedTickBehavior;

use inkpad_core::AppError;

/// A zero-argument, side-effecting job invoked once per tick.
#[async_trait]
pub trait PeriodicTask: Send + Sync {
    /// Short name used in log fields.
    fn name(&self) -> &str;

    async fn run(&self) -> Result<(), AppError>;
}

#[derive(Default)]
pub struct PeriodicTaskRegistry {
    tasks: Mutex<Vec<Arc<dyn PeriodicTask>>>,
}

impl PeriodicTaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a task. Registration order is invocation order.
    pub fn register(&self, task: Arc<dyn PeriodicTask>) {
        let mut tasks = self.tasks.lock().expect("periodic task list poisoned");
        tracing::debug!(task = task.name(), position = tasks.len(), "Periodic task registered");
        tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().expect("periodic task list poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs every registered task once, in order. A task failure is logged
    /// and does not stop the remaining tasks in the same tick.
    pub async fn tick(&self) {
        let snapshot: Vec<Arc<dyn PeriodicTask>> = {
            let tasks = self.tasks.lock().expect("periodic task list poisoned");
            tasks.clone()
        };

        for task in snapshot {
            if let Err(e) = task.run().await {
                tracing::warn!(task = task.name(), error = %e, "Periodic task failed");
            }
        }
    }

    /// Drives [`tick`](Self::tick) on a fixed interval until the handle is
    /// aborted or the runtime shuts down.
    pub fn spawn(self: Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // first interval tick fires immediately; skip it so tasks start
            // one full period after setup, matching the page timer
            interval.tick().await;
            loop {
                interval.tick().await;
                self.tick().await;
            }
        })
    }
}
