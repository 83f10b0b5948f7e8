//! Infrastructure layer for the document-sealing ledger
//!
//! Contains:
//! - Seal admission rules (pure, no storage)
//! - The `SealLedger` trait and its in-memory store
//! - Verification query dispatch
//! - Graceful shutdown (signal handling, request draining)

mod admission;
mod error;
mod ledger;
mod shutdown;
mod traits;
mod verify;

pub use admission::{check_request, Admission, CheckedSeal, DocumentState};
pub use error::*;
pub use ledger::InMemorySealLedger;
pub use shutdown::{serve_with_shutdown, shutdown_signal, ShutdownCoordinator, ShutdownSignal};
pub use traits::*;
pub use verify::{verify, VerifyOutcome};
