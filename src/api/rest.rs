//! REST routes for the sealing service.

use axum::routing::{get, post};
use axum::Router;

use crate::api::handlers::{get_document, seal_document, verify_document};
use crate::server::AppState;

/// Build the `/api` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/seal", post(seal_document))
        .route("/v1/verify", post(verify_document))
        .route("/v1/documents/:doc_hash", get(get_document))
}

/// Root-level routes kept for clients that post to `/seal` and `/verify`.
pub fn compat_router() -> Router<AppState> {
    Router::new()
        .route("/seal", post(seal_document))
        .route("/verify", post(verify_document))
}
