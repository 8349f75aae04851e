use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use super::{parse_task_id, AppState};
use crate::error::AppError;
use crate::models::{CreateTaskInput, Task};
use crate::observability::RequestContext;

#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

/// GET /tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> Result<Json<Vec<Task>>, AppError> {
    let result = async {
        let Query(query) = query?;
        Ok::<_, AppError>(
            state
                .tasks
                .list_matching(query.status.as_deref(), query.search.as_deref())
                .await?,
        )
    }
    .await;

    match result {
        Ok(tasks) => {
            state.log_success(&ctx, json!({ "count": tasks.len() }), "Tasks listed");
            Ok(Json(tasks))
        }
        Err(e) => {
            state.log_failure(&ctx, json!({}), "Failed to list tasks", &e);
            Err(e)
        }
    }
}

/// POST /tasks
pub async fn create_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<CreateTaskInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let result = async {
        let Json(input) = payload?;
        Ok::<_, AppError>(state.tasks.create(input).await?)
    }
    .await;

    match result {
        Ok(task) => {
            state.log_success(
                &ctx,
                json!({ "task_id": task.id, "status": task.status }),
                "Task created",
            );
            Ok((StatusCode::CREATED, Json(task)))
        }
        Err(e) => {
            state.log_failure(&ctx, json!({}), "Failed to create task", &e);
            Err(e)
        }
    }
}

/// GET /tasks/:id
pub async fn get_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Json<Task>, AppError> {
    let result = async {
        let id = parse_task_id(&id)?;
        Ok::<_, AppError>(state.tasks.get(id).await?)
    }
    .await;

    match result {
        Ok(task) => {
            state.log_success(&ctx, json!({ "task_id": task.id }), "Task fetched");
            Ok(Json(task))
        }
        Err(e) => {
            state.log_failure(&ctx, json!({ "task_id": id }), "Failed to fetch task", &e);
            Err(e)
        }
    }
}

/// PATCH /tasks/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<Task>, AppError> {
    let result = async {
        let id = parse_task_id(&id)?;
        let Json(request) = payload?;
        Ok::<_, AppError>(state.tasks.update_status(id, request.status.as_deref()).await?)
    }
    .await;

    match result {
        Ok(task) => {
            state.log_success(
                &ctx,
                json!({ "task_id": task.id, "status": task.status }),
                "Task status updated",
            );
            Ok(Json(task))
        }
        Err(e) => {
            state.log_failure(&ctx, json!({ "task_id": id }), "Failed to update task status", &e);
            Err(e)
        }
    }
}

/// POST /tasks/:id/start
pub async fn start_timer(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Json<Task>, AppError> {
    let result = async {
        let id = parse_task_id(&id)?;
        Ok::<_, AppError>(state.tasks.start_timer(id).await?)
    }
    .await;

    match result {
        Ok(task) => {
            state.log_success(
                &ctx,
                json!({ "task_id": task.id, "timer_started_at": task.timer_started_at }),
                "Timer started",
            );
            Ok(Json(task))
        }
        Err(e) => {
            state.log_failure(&ctx, json!({ "task_id": id }), "Failed to start timer", &e);
            Err(e)
        }
    }
}

/// POST /tasks/:id/stop
pub async fn stop_timer(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Json<Task>, AppError> {
    let result = async {
        let id = parse_task_id(&id)?;
        Ok::<_, AppError>(state.tasks.stop_timer(id).await?)
    }
    .await;

    match result {
        Ok(task) => {
            state.log_success(
                &ctx,
                json!({ "task_id": task.id, "time_logged": task.time_logged }),
                "Timer stopped",
            );
            Ok(Json(task))
        }
        Err(e) => {
            state.log_failure(&ctx, json!({ "task_id": id }), "Failed to stop timer", &e);
            Err(e)
        }
    }
}
