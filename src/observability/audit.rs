//! Durable request audit log

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::store::StoreResult;

/// One completed HTTP request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLogRecord {
    pub route: String,
    pub method: String,
    pub status_code: u16,
    pub duration_ms: u64,
    /// Only set for non-2xx outcomes
    pub error_message: Option<String>,
}

/// Append-only sink for request log records
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, record: &RequestLogRecord) -> StoreResult<()>;
}

/// Writes records into the `request_logs` table
#[derive(Clone)]
pub struct SqliteAuditSink {
    pool: SqlitePool,
}

impl SqliteAuditSink {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for SqliteAuditSink {
    async fn append(&self, record: &RequestLogRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO request_logs (route, method, status_code, duration_ms, error_message)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&record.route)
        .bind(&record.method)
        .bind(record.status_code as i64)
        .bind(record.duration_ms as i64)
        .bind(&record.error_message)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
