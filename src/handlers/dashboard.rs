use axum::{extract::State, Extension, Json};
use serde_json::json;

use super::AppState;
use crate::error::AppError;
use crate::observability::RequestContext;
use crate::services::DashboardSummary;

/// GET /dashboard/summary
pub async fn get_summary(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<DashboardSummary>, AppError> {
    match state.dashboard.summary().await {
        Ok(summary) => {
            state.log_success(
                &ctx,
                json!({ "total_tasks": summary.total_tasks }),
                "Dashboard summary computed",
            );
            Ok(Json(summary))
        }
        Err(e) => {
            let e = AppError::from(e);
            state.log_failure(&ctx, json!({}), "Failed to compute dashboard summary", &e);
            Err(e)
        }
    }
}
