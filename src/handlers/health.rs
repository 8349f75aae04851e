use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "taskwatch",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
