pub mod auth;
pub mod dashboard;
pub mod health;
pub mod tasks;

use serde_json::Value;
use std::sync::Arc;

use crate::error::AppError;
use crate::observability::{RequestContext, StructuredLogger};
use crate::services::{AuthService, DashboardService, TaskService};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub tasks: Arc<TaskService>,
    pub auth: Arc<AuthService>,
    pub dashboard: Arc<DashboardService>,
    pub logger: Arc<StructuredLogger>,
}

impl AppState {
    /// Log a handler success at info with the request's counter and elapsed time
    pub(crate) fn log_success(&self, ctx: &RequestContext, context: Value, message: &str) {
        self.logger.info(with_request(ctx, context), message);
    }

    /// Log a handler failure: client errors at warn, unexpected ones at error
    pub(crate) fn log_failure(
        &self,
        ctx: &RequestContext,
        context: Value,
        message: &str,
        err: &AppError,
    ) {
        let mut context = with_request(ctx, context);
        context["error"] = Value::String(err.to_string());

        if err.is_internal() {
            self.logger.error(context, message);
        } else {
            self.logger.warn(context, message);
        }
    }
}

fn with_request(ctx: &RequestContext, mut context: Value) -> Value {
    if !context.is_object() {
        context = serde_json::json!({ "detail": context });
    }
    context["request_count"] = ctx.request_count.into();
    context["duration_ms"] = ctx.elapsed_ms().into();
    context
}

/// Parse a `:id` path segment; non-numeric ids are a validation error
pub(crate) fn parse_task_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::Validation("Invalid task id".to_string()))
}
