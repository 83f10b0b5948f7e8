//! Health, readiness and metrics handlers.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{HealthResponse, ReadyResponse};
use crate::server::AppState;

/// GET /health - Liveness probe.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /ready - Readiness probe with ledger size.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<ReadyResponse>, ApiError> {
    let stats = state.ledger.stats().await?;
    Ok(Json(stats.into()))
}

/// GET /metrics - Prometheus text exposition.
pub async fn metrics_export(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.ledger.stats().await?;
    state.metrics.set_ledger_stats(stats);

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.to_prometheus(),
    ))
}
