//! Request observability
//!
//! - **Structured logger**: leveled console lines with a JSON context, plus the
//!   process-wide request counter
//! - **Audit sink**: one persisted `request_logs` row per completed request
//! - **Lifecycle middleware**: times every request and feeds both of the above
//!
//! ```text
//! request ─▶ lifecycle ─▶ handler ─▶ lifecycle ─▶ response
//!                │                       │
//!                └──▶ logger (console)   └──▶ spawned audit write
//! ```

pub mod audit;
pub mod lifecycle;
pub mod logger;

pub use audit::{AuditSink, RequestLogRecord, SqliteAuditSink};
pub use lifecycle::{request_lifecycle, AuditError, RequestContext};
pub use logger::StructuredLogger;
