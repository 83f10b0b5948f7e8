//! HTTP server bootstrap for the sealing service.
//!
//! This module wires together:
//! - configuration
//! - the seal ledger and metrics registry
//! - the Axum router
//! - graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use crate::api::handlers::{health_check, metrics_export, readiness_check};
use crate::infra::{
    serve_with_shutdown, shutdown_signal, InMemorySealLedger, SealLedger, ShutdownCoordinator,
};
use crate::metrics::MetricsRegistry;

const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 10;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server listen address.
    pub listen_addr: SocketAddr,
    /// Raw `CORS_ALLOW_ORIGINS` value; `None` disables CORS.
    pub cors_allow_origins: Option<String>,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
    /// Drain window after a shutdown signal.
    pub shutdown_timeout: Duration,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = lookup("PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(8080);

        let listen_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address {host}:{port}: {e}"))?;

        let max_body_bytes = lookup("MAX_BODY_BYTES")
            .and_then(|v| v.trim().parse().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);

        let shutdown_timeout = lookup("SHUTDOWN_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS));

        let log_format = match lookup("LOG_FORMAT") {
            Some(v) if v.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let cors_allow_origins = lookup("CORS_ALLOW_ORIGINS")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            listen_addr,
            cors_allow_origins,
            max_body_bytes,
            shutdown_timeout,
            log_format,
        })
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn SealLedger>,
    pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
    pub fn new(ledger: Arc<dyn SealLedger>) -> Self {
        Self {
            ledger,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// State over a fresh in-memory ledger.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemorySealLedger::new()))
    }
}

/// Start the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    info!("Starting docseal-ledger v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded");
    info!("  Listen address: {}", config.listen_addr);
    info!("  Max body bytes: {}", config.max_body_bytes);

    let state = AppState::in_memory();
    let app = build_router(&config)?.with_state(state);

    let coordinator = Arc::new(ShutdownCoordinator::new());
    {
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            coordinator.shutdown();
        });
    }

    info!("Starting HTTP server on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;

    info!("docseal-ledger is ready to accept connections");
    serve_with_shutdown(
        listener,
        app,
        coordinator.signal(),
        config.shutdown_timeout,
    )
    .await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

/// Build the full router, minus state.
pub fn build_router(config: &Config) -> anyhow::Result<Router<AppState>> {
    let mut router = Router::new()
        .merge(crate::api::compat_router())
        .nest("/api", crate::api::router())
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_export))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http());

    if let Some(cors_layer) = cors_layer(config.cors_allow_origins.as_deref())? {
        router = router.layer(cors_layer);
    }

    Ok(router)
}

fn cors_layer(origins: Option<&str>) -> anyhow::Result<Option<CorsLayer>> {
    let origins = match origins.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return Ok(None),
    };

    let allow_origin = if origins == "*" {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin {s:?}: {e}"))
            })
            .collect::<anyhow::Result<_>>()?;
        AllowOrigin::list(origins)
    };

    Ok(Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([axum::http::header::CONTENT_TYPE]),
    ))
}
