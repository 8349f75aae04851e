//! Persistence traits and their SQLite implementations
//!
//! Services only see the traits, so tests can substitute slow or failing
//! stores without touching the database.

pub mod tasks;
pub mod users;

pub use tasks::{SqliteTaskStore, TaskStore, TimerFields};
pub use users::{CredentialStore, SqliteUserStore};

/// Storage failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Row {0} disappeared during update")]
    RowVanished(i64),
}

pub type StoreResult<T> = Result<T, StoreError>;
