//! Per-task start/stop timer
//!
//! Each transition reads the task, checks the precondition and persists the
//! new timer columns while holding that task's async mutex. Two requests racing
//! on the same task therefore see each other's result instead of the same
//! prior state.

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{TaskError, TIMER_ALREADY_RUNNING, TIMER_NOT_RUNNING};
use crate::models::Task;
use crate::store::{TaskStore, TimerFields};

pub struct TimerStateMachine {
    store: Arc<dyn TaskStore>,
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl TimerStateMachine {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            store,
            locks: DashMap::new(),
        }
    }

    /// Stopped → Running
    pub async fn start(&self, task_id: i64) -> Result<Task, TaskError> {
        self.transition(task_id, |task| {
            if task.is_timer_running() {
                return Err(TaskError::InvalidTransition(TIMER_ALREADY_RUNNING));
            }

            Ok(TimerFields {
                time_logged: task.time_logged,
                timer_started_at: Some(Utc::now()),
            })
        })
        .await
    }

    /// Running → Stopped, adding the elapsed milliseconds to `time_logged`
    pub async fn stop(&self, task_id: i64) -> Result<Task, TaskError> {
        self.transition(task_id, |task| {
            let started_at = task
                .timer_started_at
                .ok_or(TaskError::InvalidTransition(TIMER_NOT_RUNNING))?;

            // A clock step backwards must not shrink the total
            let elapsed_ms = (Utc::now() - started_at).num_milliseconds().max(0);

            Ok(TimerFields {
                time_logged: task.time_logged.saturating_add(elapsed_ms),
                timer_started_at: None,
            })
        })
        .await
    }

    async fn transition<F>(&self, task_id: i64, next: F) -> Result<Task, TaskError>
    where
        F: FnOnce(&Task) -> Result<TimerFields, TaskError>,
    {
        let lock = self.locks.entry(task_id).or_default().clone();
        let guard = lock.lock().await;

        let result = self.apply(task_id, next).await;

        drop(guard);
        drop(lock);
        // Waiters hold their own clone, so an entry nobody else references can go
        self.locks.remove_if(&task_id, |_, l| Arc::strong_count(l) == 1);

        result
    }

    /// Read, check and persist; callers hold the task's lock
    async fn apply<F>(&self, task_id: i64, next: F) -> Result<Task, TaskError>
    where
        F: FnOnce(&Task) -> Result<TimerFields, TaskError>,
    {
        let task = self.store.find(task_id).await?.ok_or(TaskError::NotFound)?;

        let fields = next(&task)?;
        let updated = self.store.update_timer_fields(task_id, fields).await?;

        tracing::debug!(
            task_id,
            running = updated.is_timer_running(),
            time_logged = updated.time_logged,
            "Timer transition applied"
        );

        Ok(updated)
    }
}
