//! Seal submission handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::debug;

use crate::api::error::ApiError;
use crate::api::types::SealResponse;
use crate::domain::SealRequest;
use crate::server::AppState;

/// POST /seal, /api/v1/seal - Admit and append one seal.
pub async fn seal_document(
    State(state): State<AppState>,
    payload: Result<Json<SealRequest>, JsonRejection>,
) -> Result<Json<SealResponse>, ApiError> {
    let timer = state.metrics.start_seal_timer();

    let result = match payload {
        Ok(Json(request)) => state.ledger.seal(request).await.map_err(ApiError::from),
        Err(rejection) => Err(ApiError::from(rejection)),
    };
    timer.finish();

    match result {
        Ok(receipt) => {
            state.metrics.record_seal_accepted();
            Ok(Json(receipt.into()))
        }
        Err(err) => {
            debug!(code = %err.code, error = %err.error, "Seal rejected");
            state.metrics.record_seal_rejected(err.code.as_str());
            Err(err)
        }
    }
}
