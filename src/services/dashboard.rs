use serde::Serialize;
use sqlx::SqlitePool;

use crate::models::TaskStatus;
use crate::store::StoreResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_tasks: i64,
    pub todo: i64,
    pub in_progress: i64,
    pub done: i64,
    /// Sum of `time_logged` over all tasks, milliseconds
    pub total_time_logged: i64,
    pub running_timers: i64,
    pub requests: RequestStats,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestStats {
    pub total: i64,
    /// Requests that finished with status >= 400
    pub errors: i64,
    pub avg_duration_ms: f64,
}

/// Aggregates task and request-log statistics straight from the database
pub struct DashboardService {
    pool: SqlitePool,
}

impl DashboardService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn summary(&self) -> StoreResult<DashboardSummary> {
        let (total_tasks, total_time_logged, running_timers) = sqlx::query_as::<_, (i64, i64, i64)>(
            "SELECT COUNT(*),
                    COALESCE(SUM(time_logged), 0),
                    COALESCE(SUM(CASE WHEN timer_started_at IS NOT NULL THEN 1 ELSE 0 END), 0)
             FROM tasks",
        )
        .fetch_one(&self.pool)
        .await?;

        let by_status = sqlx::query_as::<_, (TaskStatus, i64)>(
            "SELECT status, COUNT(*) FROM tasks GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        let count_for = |status: TaskStatus| {
            by_status
                .iter()
                .find(|(s, _)| *s == status)
                .map(|(_, n)| *n)
                .unwrap_or(0)
        };

        let (total, errors, avg_duration_ms) = sqlx::query_as::<_, (i64, i64, f64)>(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN status_code >= 400 THEN 1 ELSE 0 END), 0),
                    COALESCE(AVG(duration_ms), 0.0)
             FROM request_logs",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardSummary {
            total_tasks,
            todo: count_for(TaskStatus::Todo),
            in_progress: count_for(TaskStatus::InProgress),
            done: count_for(TaskStatus::Done),
            total_time_logged,
            running_timers,
            requests: RequestStats {
                total,
                errors,
                avg_duration_ms,
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::models::NewTask;
    use crate::observability::{AuditSink, RequestLogRecord, SqliteAuditSink};
    use crate::store::{SqliteTaskStore, TaskStore, TimerFields};

    #[tokio::test]
    async fn test_summary_of_empty_database() {
        let service = DashboardService::new(connect_in_memory().await.unwrap());

        let summary = service.summary().await.unwrap();
        assert_eq!(summary.total_tasks, 0);
        assert_eq!(summary.total_time_logged, 0);
        assert_eq!(summary.requests.total, 0);
        assert_eq!(summary.requests.avg_duration_ms, 0.0);
    }

    #[tokio::test]
    async fn test_summary_aggregates_tasks_and_requests() {
        let pool = connect_in_memory().await.unwrap();
        let tasks = SqliteTaskStore::new(pool.clone());
        let audit = SqliteAuditSink::new(pool.clone());

        for (name, status) in [
            ("a", TaskStatus::Todo),
            ("b", TaskStatus::Todo),
            ("c", TaskStatus::InProgress),
            ("d", TaskStatus::Done),
        ] {
            tasks
                .insert(NewTask {
                    user_id: 1,
                    name: name.to_string(),
                    description: String::new(),
                    status,
                })
                .await
                .unwrap();
        }
        tasks
            .update_timer_fields(1, TimerFields { time_logged: 1200, timer_started_at: None })
            .await
            .unwrap();
        tasks
            .update_timer_fields(3, TimerFields { time_logged: 300, timer_started_at: Some(chrono::Utc::now()) })
            .await
            .unwrap();

        for (status_code, duration_ms) in [(200, 10), (201, 20), (404, 30)] {
            audit
                .append(&RequestLogRecord {
                    route: "/tasks".to_string(),
                    method: "GET".to_string(),
                    status_code,
                    duration_ms,
                    error_message: None,
                })
                .await
                .unwrap();
        }

        let summary = DashboardService::new(pool).summary().await.unwrap();
        assert_eq!(summary.total_tasks, 4);
        assert_eq!(summary.todo, 2);
        assert_eq!(summary.in_progress, 1);
        assert_eq!(summary.done, 1);
        assert_eq!(summary.total_time_logged, 1500);
        assert_eq!(summary.running_timers, 1);
        assert_eq!(summary.requests.total, 3);
        assert_eq!(summary.requests.errors, 1);
        assert_eq!(summary.requests.avg_duration_ms, 20.0);
    }
}
