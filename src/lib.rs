//! Document-sealing ledger
//!
//! A document, identified by its content hash, collects an ordered,
//! append-only list of seals from the parties its first (business) seal
//! authorized.
//!
//! ## Modules
//!
//! - [`domain`] - Seal records, policies, request shapes and field validation
//! - [`infra`] - Seal admission, the in-memory ledger, verification queries
//! - [`metrics`] - Counters and latency histogram with Prometheus export
//! - [`api`] - REST routes and structured errors
//! - [`server`] - Configuration and HTTP bootstrap

pub mod api;
pub mod domain;
pub mod infra;
pub mod metrics;
pub mod server;

// Re-export commonly used types
pub use domain::{
    DocumentPolicy, DocumentSummary, LedgerStats, SealReceipt, SealRecord, SealRequest,
    SignerType, VerifyQuery, VerifyRequest,
};

pub use infra::{verify, InMemorySealLedger, Result, SealError, SealErrorKind, SealLedger, VerifyOutcome};
