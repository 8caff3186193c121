//! Application startup and lifecycle management.

use crate::config::FiscalConfig;
use crate::handlers::{document_numbers, reports};
use crate::services::{
    get_metrics, init_metrics, Database, FiscalStore, NumberingService, ReportingService,
    ReportingSettings, SequenceAllocator,
};
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::FixedOffset;
use serde_json::json;
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::request_id_middleware;
use service_core::retry::RetryConfig;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<FiscalConfig>,
    pub store: Arc<dyn FiscalStore>,
    pub numbering: NumberingService,
    pub reporting: ReportingService,
}

impl AppState {
    /// Wire services over one backend.
    pub fn new<S>(config: FiscalConfig, store: Arc<S>) -> Result<Self, AppError>
    where
        S: FiscalStore + 'static,
    {
        let offset = FixedOffset::east_opt(config.business_utc_offset_minutes * 60).ok_or_else(
            || {
                AppError::ConfigError(anyhow::anyhow!(
                    "Invalid business UTC offset: {} minutes",
                    config.business_utc_offset_minutes
                ))
            },
        )?;

        let allocator = SequenceAllocator::new(
            store.clone(),
            RetryConfig::with_max_attempts(config.sequence.max_attempts),
        );
        let numbering = NumberingService::new(store.clone(), allocator, offset);
        let reporting = ReportingService::new(
            store.clone(),
            ReportingSettings {
                fallback_seller_state: config.gst.seller_state_code.clone(),
                b2c_large_threshold: config.gst.b2c_large_threshold,
            },
        );

        Ok(Self {
            config: Arc::new(config),
            store,
            numbering,
            reporting,
        })
    }
}

/// Liveness check; also reports backend reachability.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.health_check().await {
        Ok(_) => {
            tracing::debug!("Health check passed");
            (
                StatusCode::OK,
                Json(json!({
                    "status": "ok",
                    "service": state.config.service_name,
                    "version": state.config.service_version
                })),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed - database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "service": state.config.service_name,
                    "error": e.to_string()
                })),
            )
        }
    }
}

/// Readiness check endpoint for K8s.
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.health_check().await {
        Ok(_) => {
            tracing::debug!("Readiness check passed");
            StatusCode::OK
        }
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Metrics endpoint for Prometheus scraping.
async fn metrics_handler() -> impl IntoResponse {
    let metrics = get_metrics();
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        metrics,
    )
}

/// HTTP routes with the shared middleware stack.
pub fn build_router(state: AppState) -> Router {
    init_metrics();

    let trace_layer = TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
        tracing::info_span!(
            "http_request",
            method = %req.method(),
            uri = %req.uri(),
            company_id = tracing::field::Empty,
            branch_id = tracing::field::Empty,
        )
    });

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .route("/document-numbers", get(document_numbers::list_formats))
        .route("/document-numbers/preview", post(document_numbers::preview))
        .route(
            "/document-numbers/:document_type",
            get(document_numbers::get_format).post(document_numbers::update_format),
        )
        .route(
            "/document-numbers/:document_type/sequence",
            get(document_numbers::get_sequence),
        )
        .route(
            "/document-numbers/:document_type/next",
            post(document_numbers::next_number),
        )
        .route("/reports/gstr1", get(reports::gstr1))
        .route("/reports/gstr1/b2b", get(reports::b2b))
        .route("/reports/gstr1/b2c-large", get(reports::b2c_large))
        .route("/reports/gstr1/b2c-small", get(reports::b2c_small))
        .route("/reports/gstr1/hsn-summary", get(reports::hsn_summary))
        .route(
            "/reports/gstr1/document-summary",
            get(reports::document_summary),
        )
        .route("/reports/gstr1/export", get(reports::export))
        .layer(trace_layer)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: FiscalConfig) -> Result<Self, AppError> {
        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            AppError::from(e)
        })?;

        db.run_migrations().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            AppError::from(e)
        })?;

        let addr = config.common.bind_addr();
        let state = AppState::new(config, Arc::new(db))?;

        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "Fiscal service listener bound");

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        tracing::info!(
            service = "fiscal-service",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );

        axum::serve(self.listener, router).await.map_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
            std::io::Error::other(format!("HTTP server error: {}", e))
        })
    }
}
