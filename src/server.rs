use anyhow::Result;
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::{
    config::Config,
    db,
    error::AppError,
    handlers::{self, AppState},
    observability::{request_lifecycle, AuditSink, SqliteAuditSink, StructuredLogger},
    services::{AuthService, DashboardService, TaskService},
    signals::shutdown_signal,
    store::{SqliteTaskStore, SqliteUserStore},
};

/// Start the TaskWatch server
///
/// Connects the database, wires services and serves until SIGTERM/SIGINT.
pub async fn start_server(config: Config) -> Result<()> {
    let pool = db::connect(&config.database).await?;
    info!("Database ready at {}", config.database.url);

    let sink: Option<Arc<dyn AuditSink>> = if config.observability.audit_enabled {
        Some(Arc::new(SqliteAuditSink::new(pool.clone())))
    } else {
        info!("Request audit log disabled");
        None
    };

    let state = AppState {
        tasks: Arc::new(TaskService::new(Arc::new(SqliteTaskStore::new(pool.clone())))),
        auth: Arc::new(AuthService::new(Arc::new(SqliteUserStore::new(pool.clone())))),
        dashboard: Arc::new(DashboardService::new(pool.clone())),
        logger: Arc::new(StructuredLogger::new(sink)),
    };

    let app = create_router(state);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting TaskWatch on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    pool.close().await;
    info!("Server stopped gracefully");

    Ok(())
}

/// Build the router with every route behind the request lifecycle middleware
pub fn create_router(state: AppState) -> Router {
    let logger = state.logger.clone();

    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/tasks",
            get(handlers::tasks::list_tasks).post(handlers::tasks::create_task),
        )
        .route("/tasks/:id", get(handlers::tasks::get_task))
        .route("/tasks/:id/status", patch(handlers::tasks::update_status))
        .route("/tasks/:id/start", post(handlers::tasks::start_timer))
        .route("/tasks/:id/stop", post(handlers::tasks::stop_timer))
        .route("/dashboard/summary", get(handlers::dashboard::get_summary))
        .route("/health", get(handlers::health::health_check))
        .fallback(|| async { AppError::NotFound("Route not found".to_string()) })
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn_with_state(logger, request_lifecycle))
}
