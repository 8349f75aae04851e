//! Request lifecycle middleware
//!
//! Wraps every route: counts and times the request, logs it on the way in, and
//! on the way out hands the outcome to the audit log and logs completion.

use axum::{
    body::{to_bytes, Body},
    extract::{Query, Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use super::logger::StructuredLogger;

/// Request bodies above this size are rejected before reaching a handler
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Per-request data made available to handlers through request extensions
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    pub request_count: u64,
    pub started_at: Instant,
}

impl RequestContext {
    pub fn elapsed_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }
}

/// Error detail attached to a response for the audit log; never sent to the client
#[derive(Debug, Clone)]
pub struct AuditError(pub String);

pub async fn request_lifecycle(
    State(logger): State<Arc<StructuredLogger>>,
    req: Request,
    next: Next,
) -> Response {
    let context = RequestContext {
        request_count: logger.increment_request_count(),
        started_at: Instant::now(),
    };
    let method = req.method().clone();
    let route = req.uri().path().to_string();
    let query = Query::<BTreeMap<String, String>>::try_from_uri(req.uri())
        .map(|Query(q)| q)
        .unwrap_or_default();

    let (mut parts, body) = req.into_parts();
    let mut inbound = json!({
        "route": route,
        "method": method.as_str(),
        "request_count": context.request_count,
        "query": query,
    });

    let body = if method == Method::GET || method == Method::HEAD {
        body
    } else {
        match to_bytes(body, MAX_BODY_BYTES).await {
            Ok(bytes) => {
                inbound["body"] = body_for_log(&bytes);
                Body::from(bytes)
            }
            Err(e) => {
                logger.info(inbound, &format!("Handling {} {} request", method, route));
                let (status, message, detail) = body_read_failure(e);
                let response = (status, axum::Json(json!({ "error": message }))).into_response();
                return complete(&logger, &context, &method, &route, response, Some(detail));
            }
        }
    };

    logger.info(inbound, &format!("Handling {} {} request", method, route));

    parts.extensions.insert(context);
    let response = next.run(Request::from_parts(parts, body)).await;

    complete(&logger, &context, &method, &route, response, None)
}

fn complete(
    logger: &StructuredLogger,
    context: &RequestContext,
    method: &Method,
    route: &str,
    response: Response,
    fallback_error: Option<String>,
) -> Response {
    let status = response.status();
    let duration_ms = context.elapsed_ms();

    let error_message = if status.is_success() {
        None
    } else {
        response
            .extensions()
            .get::<AuditError>()
            .map(|e| e.0.clone())
            .or(fallback_error)
            .or_else(|| status.canonical_reason().map(str::to_string))
    };

    // Dropping the handle detaches the write from the response path
    drop(logger.log_request(route, method.as_str(), status.as_u16(), duration_ms, error_message));

    logger.info(
        json!({
            "route": route,
            "method": method.as_str(),
            "request_count": context.request_count,
            "status_code": status.as_u16(),
            "duration_ms": duration_ms,
        }),
        &format!("{} {} completed", method, route),
    );

    response
}

/// 413 when the body exceeded [`MAX_BODY_BYTES`], 400 when it could not be read at all
fn body_read_failure(err: axum::Error) -> (StatusCode, &'static str, String) {
    let detail = err.to_string();

    if err.into_inner().downcast_ref::<LengthLimitError>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large", detail)
    } else {
        (StatusCode::BAD_REQUEST, "Failed to read request body", detail)
    }
}

fn body_for_log(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }

    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::audit::{AuditSink, RequestLogRecord};
    use crate::store::StoreResult;
    use async_trait::async_trait;
    use axum::{middleware, routing::{get, post}, Extension, Router};
    use std::sync::Mutex;
    use std::time::Duration;
    use tower::ServiceExt;

    #[derive(Default)]
    struct RecordingSink {
        records: Mutex<Vec<RequestLogRecord>>,
    }

    #[async_trait]
    impl AuditSink for RecordingSink {
        async fn append(&self, record: &RequestLogRecord) -> StoreResult<()> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    fn test_router(logger: Arc<StructuredLogger>) -> Router {
        Router::new()
            .route(
                "/count",
                get(|Extension(ctx): Extension<RequestContext>| async move {
                    ctx.request_count.to_string()
                }),
            )
            .route("/echo", post(|body: String| async move { body }))
            .route(
                "/fail",
                get(|| async {
                    let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
                    response.extensions_mut().insert(AuditError("db exploded".to_string()));
                    response
                }),
            )
            .fallback(|| async { StatusCode::NOT_FOUND })
            .layer(middleware::from_fn_with_state(logger, request_lifecycle))
    }

    async fn wait_for_records(sink: &RecordingSink, n: usize) -> Vec<RequestLogRecord> {
        for _ in 0..100 {
            {
                let records = sink.records.lock().unwrap();
                if records.len() >= n {
                    return records.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        sink.records.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_counter_visible_to_handler() {
        let logger = Arc::new(StructuredLogger::new(None));
        let app = test_router(logger.clone());

        for expected in 1..=3u64 {
            let response = app
                .clone()
                .oneshot(Request::builder().uri("/count").body(Body::empty()).unwrap())
                .await
                .unwrap();
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert_eq!(body, expected.to_string().as_bytes());
        }
        assert_eq!(logger.request_count(), 3);
    }

    #[tokio::test]
    async fn test_body_is_reattached_for_handler() {
        let logger = Arc::new(StructuredLogger::new(None));
        let app = test_router(logger);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .body(Body::from(r#"{"name":"Write spec"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, r#"{"name":"Write spec"}"#.as_bytes());
    }

    #[tokio::test]
    async fn test_records_outcome_in_audit_log() {
        let sink = Arc::new(RecordingSink::default());
        let logger = Arc::new(StructuredLogger::new(Some(sink.clone())));
        let app = test_router(logger);

        app.clone()
            .oneshot(Request::builder().uri("/count?x=1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        app.oneshot(Request::builder().uri("/fail").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let mut records = wait_for_records(&sink, 2).await;
        records.sort_by_key(|r| r.status_code);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].route, "/count");
        assert_eq!(records[0].method, "GET");
        assert_eq!(records[0].status_code, 200);
        assert!(records[0].error_message.is_none());

        assert_eq!(records[1].route, "/fail");
        assert_eq!(records[1].status_code, 500);
        assert_eq!(records[1].error_message.as_deref(), Some("db exploded"));
    }

    #[tokio::test]
    async fn test_unmatched_route_uses_reason_phrase() {
        let sink = Arc::new(RecordingSink::default());
        let logger = Arc::new(StructuredLogger::new(Some(sink.clone())));
        let app = test_router(logger);

        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let records = wait_for_records(&sink, 1).await;
        assert_eq!(records[0].error_message.as_deref(), Some("Not Found"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let sink = Arc::new(RecordingSink::default());
        let logger = Arc::new(StructuredLogger::new(Some(sink.clone())));
        let app = test_router(logger);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .body(Body::from(vec![b'a'; MAX_BODY_BYTES + 1]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let records = wait_for_records(&sink, 1).await;
        assert_eq!(records[0].status_code, 413);
    }

    #[tokio::test]
    async fn test_broken_body_stream_is_bad_request() {
        let sink = Arc::new(RecordingSink::default());
        let logger = Arc::new(StructuredLogger::new(Some(sink.clone())));
        let app = test_router(logger);

        let chunks: Vec<Result<axum::body::Bytes, std::io::Error>> = vec![
            Ok(axum::body::Bytes::from_static(b"{\"name\":")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "client went away")),
        ];
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .body(Body::from_stream(futures::stream::iter(chunks)))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Failed to read request body");

        let records = wait_for_records(&sink, 1).await;
        assert_eq!(records[0].status_code, 400);
        assert!(records[0]
            .error_message
            .as_deref()
            .is_some_and(|m| m.contains("client went away")));
    }

    #[test]
    fn test_body_for_log() {
        assert_eq!(body_for_log(b""), Value::Null);
        assert_eq!(body_for_log(br#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(body_for_log(b"plain"), json!("plain"));
    }
}
