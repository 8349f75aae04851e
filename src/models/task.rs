use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum task name length, counted in characters after trimming
pub const MAX_TASK_NAME_LEN: usize = 200;

/// Task workflow status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "in_progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            _ => Err(InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A status string that is not one of `todo`, `in_progress`, `done`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid status: {0}")]
pub struct InvalidStatus(pub String);

/// A tracked task with its timer state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub status: TaskStatus,
    /// Accumulated timer time in milliseconds
    pub time_logged: i64,
    /// Set iff the timer is running
    pub timer_started_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_timer_running(&self) -> bool {
        self.timer_started_at.is_some()
    }
}

/// Validated input for inserting a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub status: TaskStatus,
}

/// Raw create-task request body; validated by the task service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTaskInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// List filters; both set means both must match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    /// Case-insensitive substring of the task name
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }

        if let Some(search) = &self.search {
            if !task.name.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }

        true
    }
}
