//! Structured console logging plus request audit routing
//!
//! Console lines go through `tracing`; the subscriber installed by
//! [`crate::init_tracing`] adds the timestamp and level. Completed requests are
//! forwarded to an [`AuditSink`] on a detached task so that a slow or broken
//! sink never holds up a response.

use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::Level;

use super::audit::{AuditSink, RequestLogRecord};

pub struct StructuredLogger {
    request_count: AtomicU64,
    sink: Option<Arc<dyn AuditSink>>,
}

impl StructuredLogger {
    /// `sink` is `None` when request auditing is disabled
    pub fn new(sink: Option<Arc<dyn AuditSink>>) -> Self {
        Self {
            request_count: AtomicU64::new(0),
            sink,
        }
    }

    /// Increment the process-wide request counter and return the new value
    pub fn increment_request_count(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    pub fn info(&self, context: Value, message: &str) {
        emit(Level::INFO, &context, message);
    }

    pub fn warn(&self, context: Value, message: &str) {
        emit(Level::WARN, &context, message);
    }

    pub fn error(&self, context: Value, message: &str) {
        emit(Level::ERROR, &context, message);
    }

    /// Append a request record to the audit sink without waiting for it
    ///
    /// Sink failures are logged at error level and go no further. The handle is
    /// returned for callers that need to observe completion; dropping it leaves
    /// the write running.
    pub fn log_request(
        &self,
        route: &str,
        method: &str,
        status_code: u16,
        duration_ms: u64,
        error_message: Option<String>,
    ) -> JoinHandle<()> {
        let record = RequestLogRecord {
            route: route.to_string(),
            method: method.to_string(),
            status_code,
            duration_ms,
            error_message,
        };
        let sink = self.sink.clone();

        tokio::spawn(async move {
            let Some(sink) = sink else {
                tracing::debug!(route = %record.route, "Request auditing disabled, record dropped");
                return;
            };

            if let Err(e) = sink.append(&record).await {
                emit(
                    Level::ERROR,
                    &json!({
                        "route": record.route,
                        "method": record.method,
                        "status_code": record.status_code,
                        "error": e.to_string(),
                    }),
                    "Failed to insert request log",
                );
            }
        })
    }
}

fn emit(level: Level, context: &Value, message: &str) {
    let context = serde_json::to_string(context).unwrap_or_else(|_| "{}".to_string());

    if level == Level::ERROR {
        tracing::error!(context = %context, "{}", message);
    } else if level == Level::WARN {
        tracing::warn!(context = %context, "{}", message);
    } else if level == Level::INFO {
        tracing::info!(context = %context, "{}", message);
    } else {
        tracing::debug!(context = %context, "{}", message);
    }
}
