use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::observability::AuditError;
use crate::services::TaskError;
use crate::store::StoreError;

/// Errors surfaced at the HTTP boundary
#[derive(Debug)]
pub enum AppError {
    /// Bad or missing input
    Validation(String),
    NotFound(String),
    /// Timer start/stop against the wrong state
    InvalidTransition(String),
    /// Login with unknown email or wrong password
    Unauthorized(String),
    /// Anything unexpected; the detail stays server-side
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidTransition(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    /// Message sent to the client
    fn public_message(&self) -> &str {
        match self {
            Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::InvalidTransition(msg)
            | Self::Unauthorized(msg) => msg,
            Self::Internal(_) => "Internal server error",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::InvalidTransition(msg)
            | Self::Unauthorized(msg)
            | Self::Internal(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.public_message() }));
        let mut response = (self.status(), body).into_response();

        // The lifecycle middleware records this in the audit log
        response.extensions_mut().insert(AuditError(self.to_string()));
        response
    }
}

impl From<TaskError> for AppError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::Validation(msg) => Self::Validation(msg),
            TaskError::NotFound => Self::NotFound(err.to_string()),
            TaskError::InvalidTransition(msg) => Self::InvalidTransition(msg.to_string()),
            TaskError::Store(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        Self::Validation(format!("Invalid JSON body: {}", err.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(err: QueryRejection) -> Self {
        Self::Validation(format!("Invalid query string: {}", err.body_text()))
    }
}
