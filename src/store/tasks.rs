use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::{StoreError, StoreResult};
use crate::models::{NewTask, Task, TaskFilter, TaskStatus};

const TASK_COLUMNS: &str =
    "id, user_id, name, description, status, time_logged, timer_started_at, created_at, updated_at";

/// Timer columns written together by a single transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFields {
    pub time_logged: i64,
    pub timer_started_at: Option<DateTime<Utc>>,
}

/// Task persistence used by the task service and the timer state machine
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn find(&self, id: i64) -> StoreResult<Option<Task>>;

    /// Tasks matching `filter`, in insertion order
    async fn list(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>>;

    async fn insert(&self, task: NewTask) -> StoreResult<Task>;

    /// Returns `None` when no task has this id
    async fn update_status(&self, id: i64, status: TaskStatus) -> StoreResult<Option<Task>>;

    /// Overwrite both timer columns in one statement
    async fn update_timer_fields(&self, id: i64, fields: TimerFields) -> StoreResult<Task>;
}

#[derive(Clone)]
pub struct SqliteTaskStore {
    pool: SqlitePool,
}

impl SqliteTaskStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn find(&self, id: i64) -> StoreResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(task)
    }

    async fn list(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        let tasks = match filter.status {
            Some(status) => {
                sqlx::query_as::<_, Task>(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE status = ? ORDER BY id ASC"
                ))
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id ASC"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        // SQLite LIKE only folds ASCII case, so the name search runs here
        Ok(tasks.into_iter().filter(|task| filter.matches(task)).collect())
    }

    async fn insert(&self, task: NewTask) -> StoreResult<Task> {
        let now = Utc::now();

        let created = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (user_id, name, description, status, time_logged, timer_started_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, 0, NULL, ?, ?)
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(task.user_id)
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.status)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update_status(&self, id: i64, status: TaskStatus) -> StoreResult<Option<Task>> {
        let updated = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET status = ?, updated_at = ? WHERE id = ? RETURNING {TASK_COLUMNS}"
        ))
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn update_timer_fields(&self, id: i64, fields: TimerFields) -> StoreResult<Task> {
        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET time_logged = ?, timer_started_at = ?, updated_at = ?
             WHERE id = ? RETURNING {TASK_COLUMNS}"
        ))
        .bind(fields.time_logged)
        .bind(fields.timer_started_at)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::RowVanished(id))
    }
}
