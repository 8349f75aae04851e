use std::sync::Arc;

use super::{TaskError, TimerStateMachine};
use crate::models::{CreateTaskInput, NewTask, Task, TaskFilter, TaskStatus, MAX_TASK_NAME_LEN};
use crate::store::TaskStore;

/// Owner assigned to new tasks; per-user ownership is not enforced
pub const DEFAULT_USER_ID: i64 = 1;

pub struct TaskService {
    store: Arc<dyn TaskStore>,
    timer: TimerStateMachine,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            timer: TimerStateMachine::new(store.clone()),
            store,
        }
    }

    /// Validate and insert a task. Status defaults to `todo`, description to empty.
    pub async fn create(&self, input: CreateTaskInput) -> Result<Task, TaskError> {
        let name = input
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| TaskError::Validation("Task name is required".to_string()))?;

        if name.chars().count() > MAX_TASK_NAME_LEN {
            return Err(TaskError::Validation("Task name is too long".to_string()));
        }

        let status = match non_empty(input.status.as_deref()) {
            Some(status) => parse_status(status)?,
            None => TaskStatus::default(),
        };

        let task = self
            .store
            .insert(NewTask {
                user_id: DEFAULT_USER_ID,
                name: name.to_string(),
                description: input.description.unwrap_or_default(),
                status,
            })
            .await?;

        Ok(task)
    }

    pub async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>, TaskError> {
        Ok(self.store.list(filter).await?)
    }

    /// List from raw query values; an unknown status matches nothing
    pub async fn list_matching(
        &self,
        status: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<Task>, TaskError> {
        match parse_filter(status, search) {
            Some(filter) => self.list(&filter).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn get(&self, id: i64) -> Result<Task, TaskError> {
        self.store.find(id).await?.ok_or(TaskError::NotFound)
    }

    pub async fn update_status(&self, id: i64, status: Option<&str>) -> Result<Task, TaskError> {
        let status = non_empty(status)
            .ok_or_else(|| TaskError::Validation("Status is required".to_string()))?;
        let status = parse_status(status)?;

        self.store
            .update_status(id, status)
            .await?
            .ok_or(TaskError::NotFound)
    }

    pub async fn start_timer(&self, id: i64) -> Result<Task, TaskError> {
        self.timer.start(id).await
    }

    pub async fn stop_timer(&self, id: i64) -> Result<Task, TaskError> {
        self.timer.stop(id).await
    }
}

/// Build list filters from raw query values; empty values count as absent
///
/// Returns `None` for a status no task can have, so the listing is empty.
pub fn parse_filter(status: Option<&str>, search: Option<&str>) -> Option<TaskFilter> {
    let status = match non_empty(status) {
        Some(raw) => Some(raw.parse().ok()?),
        None => None,
    };

    Some(TaskFilter {
        status,
        search: non_empty(search).map(str::to_string),
    })
}

fn parse_status(raw: &str) -> Result<TaskStatus, TaskError> {
    raw.parse()
        .map_err(|_| TaskError::Validation("Invalid status".to_string()))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
