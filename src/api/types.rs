//! Response envelopes for REST API handlers.

use serde::Serialize;

use crate::domain::{DocumentSummary, LedgerStats, SealReceipt};
use crate::infra::VerifyOutcome;

// ============================================================================
// Sealing
// ============================================================================

/// Response for an accepted seal.
#[derive(Debug, Serialize)]
pub struct SealResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub receipt: SealReceipt,
}

impl From<SealReceipt> for SealResponse {
    fn from(receipt: SealReceipt) -> Self {
        Self { ok: true, receipt }
    }
}

// ============================================================================
// Verification
// ============================================================================

/// Response for a verification query: `records` or `metadata` beside `ok`.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub outcome: VerifyOutcome,
}

impl From<VerifyOutcome> for VerifyResponse {
    fn from(outcome: VerifyOutcome) -> Self {
        Self { ok: true, outcome }
    }
}

/// Response for a document summary lookup.
#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub summary: DocumentSummary,
}

impl From<DocumentSummary> for DocumentResponse {
    fn from(summary: DocumentSummary) -> Self {
        Self { ok: true, summary }
    }
}

// ============================================================================
// Health
// ============================================================================

/// Response for the liveness probe.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Response for the readiness probe.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub documents: usize,
    pub seals: usize,
}

impl From<LedgerStats> for ReadyResponse {
    fn from(stats: LedgerStats) -> Self {
        Self {
            status: "ready",
            documents: stats.documents,
            seals: stats.seals,
        }
    }
}
