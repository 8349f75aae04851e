pub mod auth;
pub mod dashboard;
pub mod tasks;
pub mod timer;

pub use auth::{AuthService, LoginResponse};
pub use dashboard::{DashboardService, DashboardSummary};
pub use tasks::TaskService;
pub use timer::TimerStateMachine;

use crate::store::StoreError;

/// Failures of task and timer operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Bad or missing input; nothing was changed
    #[error("{0}")]
    Validation(String),
    #[error("Task not found")]
    NotFound,
    /// Timer start/stop against the wrong state
    #[error("{0}")]
    InvalidTransition(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub const TIMER_ALREADY_RUNNING: &str = "Timer already running";
pub const TIMER_NOT_RUNNING: &str = "Timer not running";
