use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::error::AppError;
use crate::observability::RequestContext;
use crate::services::LoginResponse;

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let result = async {
        let Json(request) = payload?;
        let (Some(email), Some(password)) = (
            request.email.filter(|e| !e.is_empty()),
            request.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        };

        state
            .auth
            .login(&email, &password)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))
    }
    .await;

    match result {
        Ok(login) => {
            state.log_success(&ctx, json!({ "user_id": login.user.id }), "Login succeeded");
            Ok(Json(login))
        }
        Err(e) => {
            state.log_failure(&ctx, json!({}), "Login failed", &e);
            Err(e)
        }
    }
}
