//! Core type definitions for the sealing ledger
//!
//! Seal records, document policies and the limits every document is held to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard ceiling on seals stored for any single document hash,
/// independent of the document's own `max_signers`.
pub const MAX_SEALS_PER_DOCUMENT: usize = 10;

/// Minimum decoded length (bytes) of a hex hash or signature.
pub const MIN_HASH_LEN_BYTES: usize = 32;

/// Maximum decoded length (bytes) of a hex hash or signature.
pub const MAX_HASH_LEN_BYTES: usize = 128;

/// Maximum UTF-8 length of `doc_type`.
pub const MAX_DOC_TYPE_LEN: usize = 64;

/// Maximum UTF-8 length of `business_id`.
pub const MAX_BUSINESS_ID_LEN: usize = 64;

/// Maximum decoded length of `student_name_b64`.
pub const MAX_STUDENT_NAME_LEN: usize = 128;

/// Length of a signer address (`G` followed by 55 uppercase alphanumerics).
pub const ADDRESS_LEN: usize = 56;

/// Party kind of a seal.
///
/// 0 = student, 1 = business. Only a business may open a document.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde_repr::Serialize_repr, serde_repr::Deserialize_repr,
)]
#[repr(u8)]
pub enum SignerType {
    /// Student (holder of the document)
    Student = 0,
    /// Business (issuing institution)
    Business = 1,
}

impl SignerType {
    pub fn from_i64(v: i64) -> Option<Self> {
        match v {
            0 => Some(SignerType::Student),
            1 => Some(SignerType::Business),
            _ => None,
        }
    }

    pub fn is_business(&self) -> bool {
        matches!(self, SignerType::Business)
    }
}

impl fmt::Display for SignerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignerType::Student => write!(f, "student"),
            SignerType::Business => write!(f, "business"),
        }
    }
}

/// Authorization rules for a document, fixed by its first seal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPolicy {
    /// Addresses permitted to seal, in the order they were supplied.
    pub allowed_signers: Vec<String>,
    /// Total seals the document may ever accept.
    pub max_signers: u32,
}

impl DocumentPolicy {
    pub fn allows(&self, signer: &str) -> bool {
        self.allowed_signers.iter().any(|s| s == signer)
    }
}

/// A single accepted seal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealRecord {
    pub doc_hash: String,
    pub signature: String,
    pub signer: String,
    pub doc_type: String,
    /// Seconds since the Unix epoch, assigned at acceptance.
    pub timestamp: u64,
    pub signer_type: SignerType,
    pub vc_hash: String,
    pub business_id: String,
    /// Only set on the seal that opened the document.
    pub student_name_b64: String,
}

/// Result of an accepted seal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealReceipt {
    /// Ledger length after the append.
    pub total_records: usize,
    pub doc_hash: String,
    pub record: SealRecord,
    pub metadata: Option<DocumentPolicy>,
}

/// Point-in-time view of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub doc_hash: String,
    pub exists: bool,
    pub total_records: usize,
    pub metadata: Option<DocumentPolicy>,
}

/// Ledger-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    /// Documents holding at least one seal.
    pub documents: usize,
    /// Seals across all documents.
    pub seals: usize,
}
