//! Verification and document lookup handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{DocumentResponse, VerifyResponse};
use crate::domain::{VerifyQuery, VerifyRequest};
use crate::infra::verify;
use crate::server::AppState;

/// POST /verify, /api/v1/verify - Run a verification query by mode.
pub async fn verify_document(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let Json(request) = payload?;
    let query = VerifyQuery::try_from(request)?;

    state.metrics.record_verify(query.mode());
    let outcome = verify(state.ledger.as_ref(), query).await?;

    Ok(Json(outcome.into()))
}

/// GET /api/v1/documents/:doc_hash - Existence, seal count and policy.
pub async fn get_document(
    State(state): State<AppState>,
    Path(doc_hash): Path<String>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let summary = state.ledger.summary(doc_hash.trim()).await?;
    Ok(Json(summary.into()))
}
