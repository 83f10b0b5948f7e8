//! Trait definitions for the sealing engine's storage seam

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{DocumentPolicy, DocumentSummary, LedgerStats, SealReceipt, SealRecord, SealRequest};

use super::Result;

/// Seal ledger: per-document append-only seals plus a write-once policy.
///
/// Invariant: `seal` runs its admission decision and append atomically per
/// document hash. Seals on different documents do not wait on each other.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SealLedger: Send + Sync {
    /// Admit and append a seal
    ///
    /// - Validates field shapes
    /// - Opens the document's policy on the first seal
    /// - Enforces authorization, duplicate and capacity rules
    async fn seal(&self, request: SealRequest) -> Result<SealReceipt>;

    /// All seals for a document in acceptance order (empty if unknown)
    async fn records(&self, doc_hash: &str) -> Result<Vec<SealRecord>>;

    /// The document's policy, if it has been opened
    async fn policy(&self, doc_hash: &str) -> Result<Option<DocumentPolicy>>;

    /// Every seal made by `signer`, across documents
    async fn records_by_signer(&self, signer: &str) -> Result<Vec<SealRecord>>;

    /// Every seal carrying `vc_hash`, across documents
    async fn records_by_vc_hash(&self, vc_hash: &str) -> Result<Vec<SealRecord>>;

    /// Existence, seal count and policy of a document
    async fn summary(&self, doc_hash: &str) -> Result<DocumentSummary>;

    /// Ledger-wide counts
    async fn stats(&self) -> Result<LedgerStats>;
}
