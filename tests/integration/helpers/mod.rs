// Shared fixtures for the HTTP integration tests: an in-memory app, audit
// sinks with controllable behavior and a tracing layer that captures events.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::SqlitePool;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use taskwatch::{
    db,
    handlers::AppState,
    observability::{AuditSink, RequestLogRecord, SqliteAuditSink, StructuredLogger},
    server::create_router,
    services::{auth::hash_password, AuthService, DashboardService, TaskService},
    store::{SqliteTaskStore, SqliteUserStore, StoreError, StoreResult},
};
use tower::ServiceExt;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

pub struct TestApp {
    pub router: Router,
    pub logger: Arc<StructuredLogger>,
    pub pool: SqlitePool,
}

/// App backed by in-memory SQLite with the SQLite audit sink
pub async fn spawn_app() -> TestApp {
    let pool = db::connect_in_memory().await.unwrap();
    let sink = Arc::new(SqliteAuditSink::new(pool.clone()));
    build_app(pool, Some(sink)).await
}

/// App with a caller-supplied audit sink
pub async fn spawn_app_with_sink(sink: Arc<dyn AuditSink>) -> TestApp {
    let pool = db::connect_in_memory().await.unwrap();
    build_app(pool, Some(sink)).await
}

async fn build_app(pool: SqlitePool, sink: Option<Arc<dyn AuditSink>>) -> TestApp {
    let logger = Arc::new(StructuredLogger::new(sink));
    let state = AppState {
        tasks: Arc::new(TaskService::new(Arc::new(SqliteTaskStore::new(pool.clone())))),
        auth: Arc::new(AuthService::new(Arc::new(SqliteUserStore::new(pool.clone())))),
        dashboard: Arc::new(DashboardService::new(pool.clone())),
        logger: logger.clone(),
    };

    TestApp {
        router: create_router(state),
        logger,
        pool,
    }
}

impl TestApp {
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, body)
    }

    pub async fn create_user(&self, email: &str, name: &str, password: &str) {
        let hash = hash_password(password).unwrap();
        SqliteUserStore::new(self.pool.clone())
            .insert(email, name, &hash)
            .await
            .unwrap();
    }

    /// Wait until the detached audit writes have landed
    pub async fn wait_for_request_logs(&self, n: i64) -> i64 {
        let mut count = 0;
        for _ in 0..200 {
            count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM request_logs")
                .fetch_one(&self.pool)
                .await
                .unwrap();
            if count >= n {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        count
    }
}

/// Audit sink that always fails
pub struct FailingSink;

#[async_trait]
impl AuditSink for FailingSink {
    async fn append(&self, _record: &RequestLogRecord) -> StoreResult<()> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }
}

/// Audit sink that keeps records in memory
#[derive(Default)]
pub struct RecordingSink {
    pub records: Mutex<Vec<RequestLogRecord>>,
}

#[async_trait]
impl AuditSink for RecordingSink {
    async fn append(&self, record: &RequestLogRecord) -> StoreResult<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

impl RecordingSink {
    pub async fn wait_for(&self, n: usize) -> Vec<RequestLogRecord> {
        for _ in 0..200 {
            {
                let records = self.records.lock().unwrap();
                if records.len() >= n {
                    return records.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.records.lock().unwrap().clone()
    }
}

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub context: Option<String>,
}

/// Tracing layer that records every event it sees
#[derive(Clone, Default)]
pub struct CaptureLayer {
    pub events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureLayer {
    pub fn find(&self, level: Level, message: &str) -> Option<CapturedEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.level == level && e.message == message)
            .cloned()
    }

    pub async fn wait_for(&self, level: Level, message: &str) -> Option<CapturedEvent> {
        for _ in 0..200 {
            if let Some(event) = self.find(level, message) {
                return Some(event);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        None
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    context: Option<String>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{:?}", value),
            "context" => self.context = Some(format!("{:?}", value)),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "context" => self.context = Some(value.to_string()),
            _ => {}
        }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            context: visitor.context,
        });
    }
}
