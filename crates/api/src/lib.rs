//! Bike-share Station History API Server
//!
//! REST surface over the station service: a rate-limited ingestion trigger
//! and history queries, all behind a static bearer token, plus unauthenticated
//! health and Prometheus endpoints.

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use feed_client::{FeedClient, RequestContext};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use service::StationService;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use storage::StationRepository;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

pub mod auth;
pub mod error;
pub mod rate_limit;
mod routes;
pub mod settings;
pub mod validation;

use rate_limit::{create_governor_config, IngestGovernorConfig};
use settings::{AppConfig, LoggingConfig};

/// How often idle rate limiter keys are evicted
const LIMITER_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// State handed to every handler
pub type SharedState = Arc<AppState>;

/// Application state shared across handlers
pub struct AppState {
    /// Ingestion and query orchestration
    pub service: StationService,
    /// Expected bearer token
    pub auth_token: String,
    /// Deadline for outbound fetches made on behalf of one request
    pub request_timeout: Duration,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus exposition, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Cancelled on shutdown; every request context derives from it
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create new application state
    pub fn new(
        service: StationService,
        auth_token: impl Into<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            service,
            auth_token: auth_token.into(),
            request_timeout,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics: None,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Context for one request: cancelled on shutdown, bounded by the
    /// request timeout
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_token(self.shutdown.clone()).child(Some(self.request_timeout))
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: ComponentStatus,
}

/// Component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub database: ComponentHealth,
}

/// Individual component health
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Create the application router
pub fn create_router(state: SharedState, governor: Arc<IngestGovernorConfig>) -> Router {
    let ingest = Router::new()
        .route(
            "/indego-data-fetch-and-store-it-db",
            post(routes::ingest::fetch_and_store),
        )
        .layer(GovernorLayer { config: governor });

    let api = Router::new()
        .route("/stations", get(routes::stations::list_stations))
        .route("/stations/:kiosk_id", get(routes::stations::get_station))
        .merge(ingest)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Liveness check
async fn healthcheck() -> &'static str {
    "health check ok!"
}

/// Health check handler
async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let database = match state.service.repository().ping().await {
        Ok(()) => ComponentHealth {
            status: "ok".to_string(),
            error: None,
        },
        Err(e) => ComponentHealth {
            status: "error".to_string(),
            error: Some(e.to_string()),
        },
    };
    let healthy = database.error.is_none();

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components: ComponentStatus { database },
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<SharedState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let level = Level::from_str(&config.level)
        .with_context(|| format!("Invalid log level {:?}", config.level))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let result = if config.is_json() {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.context("Failed to set tracing subscriber")
}

/// Resolves on Ctrl-C, then cancels every in-flight request context
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown requested");
    shutdown.cancel();
}

/// Run the server
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let addr = config.server.socket_addr()?;

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install metrics recorder")?;

    let repository = StationRepository::connect(&config.database).await?;
    let client = FeedClient::new()?;
    let service = StationService::new(repository.clone(), client, config.feeds.clone());

    let shutdown = CancellationToken::new();
    let state = Arc::new(
        AppState::new(service, config.auth.token.clone(), config.server.request_timeout())
            .with_metrics(metrics)
            .with_shutdown(shutdown.clone()),
    );

    let governor = create_governor_config(&config.rate_limit)?;
    let limiter = governor.limiter().clone();
    let cleanup_token = shutdown.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LIMITER_CLEANUP_INTERVAL);
        loop {
            tokio::select! {
                _ = cleanup_token.cancelled() => break,
                _ = interval.tick() => limiter.retain_recent(),
            }
        }
    });

    let app = create_router(state, governor);

    info!("Starting API server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown))
    .await?;

    repository.close().await;
    info!("API server stopped");
    Ok(())
}
