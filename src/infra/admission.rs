//! Seal admission rules
//!
//! Pure decision logic for whether a seal may be appended to a document.
//! The ledger store calls [`check_request`] before taking the document lock
//! and [`DocumentState::admit`] while holding it, so the whole decision and
//! the append happen as one step per document.
//!
//! # Rule order
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. `signer_type` is numeric
//! 2. field shapes (hashes, lengths, signer address)
//! 3. `signer_type` is 0 or 1
//! 4. `student_name_b64` shape, when present
//! 5. first-seal or subsequent-seal rules
//! 6. global seal cap
//! 7. signer authorization
//! 8. duplicate signer
//! 9. per-document cap
//!
//! The order is externally visible through the error returned.

use crate::domain::validation::{
    validate_address, validate_base64_len, validate_business_id, validate_doc_type, validate_hash,
};
use crate::domain::{
    DocumentPolicy, NumericInput, SealRecord, SealRequest, SignerType, MAX_SEALS_PER_DOCUMENT,
};

use super::{Result, SealError};

/// A seal request whose stateless checks have passed.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedSeal {
    pub doc_hash: String,
    pub signature: String,
    pub signer: String,
    pub doc_type: String,
    pub signer_type: SignerType,
    pub vc_hash: String,
    pub business_id: String,
    pub student_name_b64: String,
    pub allowed_signers: Option<serde_json::Value>,
    pub max_signers: NumericInput,
}

impl CheckedSeal {
    /// Build the record that gets appended on acceptance.
    pub fn into_record(self, timestamp: u64) -> SealRecord {
        SealRecord {
            doc_hash: self.doc_hash,
            signature: self.signature,
            signer: self.signer,
            doc_type: self.doc_type,
            timestamp,
            signer_type: self.signer_type,
            vc_hash: self.vc_hash,
            business_id: self.business_id,
            student_name_b64: self.student_name_b64,
        }
    }
}

/// Run every check that does not depend on stored state.
pub fn check_request(request: SealRequest) -> Result<CheckedSeal> {
    let signer_type = request
        .signer_type
        .to_integer()
        .ok_or_else(|| SealError::invalid_input("signer_type must be numeric"))?;

    validate_hash(&request.doc_hash, "doc_hash")?;
    validate_hash(&request.signature, "signature")?;
    validate_hash(&request.vc_hash, "vc_hash")?;
    validate_doc_type(&request.doc_type)?;
    validate_business_id(&request.business_id)?;
    validate_address(&request.signer, "signer")?;

    let signer_type = SignerType::from_i64(signer_type).ok_or_else(|| {
        crate::domain::ValidationError::new(
            "signer_type",
            "signer_type must be 0 (student) or 1 (business)",
        )
    })?;

    if !request.student_name_b64.is_empty() {
        validate_base64_len(&request.student_name_b64, "student_name_b64")?;
    }

    Ok(CheckedSeal {
        doc_hash: request.doc_hash,
        signature: request.signature,
        signer: request.signer,
        doc_type: request.doc_type,
        signer_type,
        vc_hash: request.vc_hash,
        business_id: request.business_id,
        student_name_b64: request.student_name_b64,
        allowed_signers: request.allowed_signers,
        max_signers: request.max_signers,
    })
}

/// Stored state of one document: its policy and ordered seals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentState {
    pub policy: Option<DocumentPolicy>,
    pub records: Vec<SealRecord>,
}

/// Outcome of a successful admission decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    /// Policy governing this seal.
    pub policy: DocumentPolicy,
    /// True when this seal opens the document and the policy must be stored.
    pub opens_document: bool,
}

impl DocumentState {
    pub fn is_empty(&self) -> bool {
        self.policy.is_none() && self.records.is_empty()
    }

    /// Decide whether `seal` may be appended. Never mutates.
    pub fn admit(&self, seal: &CheckedSeal) -> Result<Admission> {
        let (policy, opens_document) = match &self.policy {
            None => (open_policy(seal)?, true),
            Some(existing) => {
                if !seal.student_name_b64.is_empty() {
                    return Err(SealError::policy(
                        "student_name_b64 must be empty on subsequent seals",
                    ));
                }
                (existing.clone(), false)
            }
        };

        let sealed = self.records.len();

        if sealed >= MAX_SEALS_PER_DOCUMENT {
            return Err(SealError::limit(format!(
                "Global seal limit exceeded for this document ({MAX_SEALS_PER_DOCUMENT})"
            )));
        }

        if !policy.allows(&seal.signer) {
            return Err(SealError::Forbidden(
                "Signer not in allowed_signers list".to_string(),
            ));
        }

        if self.records.iter().any(|r| r.signer == seal.signer) {
            return Err(SealError::DuplicateSigner {
                signer: seal.signer.clone(),
            });
        }

        if sealed >= policy.max_signers as usize {
            return Err(SealError::limit(format!(
                "Maximum number of signers reached ({})",
                policy.max_signers
            )));
        }

        Ok(Admission {
            policy,
            opens_document,
        })
    }

    /// Append an admitted seal, storing the policy if the seal opened the document.
    pub fn commit(&mut self, admission: Admission, record: SealRecord) -> usize {
        if admission.opens_document {
            self.policy = Some(admission.policy);
        }
        self.records.push(record);
        self.records.len()
    }
}

/// Build the policy for a document's first seal.
fn open_policy(seal: &CheckedSeal) -> Result<DocumentPolicy> {
    if !seal.signer_type.is_business() {
        return Err(SealError::policy(
            "First seal must be business (signer_type=1)",
        ));
    }

    if seal.student_name_b64.is_empty() {
        return Err(SealError::policy("student_name_b64 required on first seal"));
    }

    let allowed_signers = parse_allowed_signers(seal.allowed_signers.as_ref())?;

    let max_signers = seal
        .max_signers
        .to_integer()
        .ok_or_else(|| SealError::invalid_input("max_signers must be numeric"))?;
    if max_signers <= 0 {
        return Err(SealError::policy("max_signers must be > 0"));
    }
    let max_signers = u32::try_from(max_signers).unwrap_or(u32::MAX);

    if allowed_signers.len() > max_signers as usize {
        return Err(SealError::policy(
            "allowed_signers length cannot exceed max_signers",
        ));
    }

    let policy = DocumentPolicy {
        allowed_signers,
        max_signers,
    };

    if !policy.allows(&seal.signer) {
        return Err(SealError::policy(
            "Initial business signer must be in allowed_signers",
        ));
    }

    Ok(policy)
}

/// Normalize and validate the proposed signer list.
fn parse_allowed_signers(raw: Option<&serde_json::Value>) -> Result<Vec<String>> {
    let entries = match raw {
        None | Some(serde_json::Value::Null) => &[][..],
        Some(serde_json::Value::Array(entries)) => entries.as_slice(),
        Some(_) => return Err(SealError::invalid_input("allowed_signers must be a list")),
    };

    if entries.is_empty() {
        return Err(SealError::policy(
            "allowed_signers required and cannot be empty",
        ));
    }

    entries
        .iter()
        .map(|entry| {
            let address = match entry {
                serde_json::Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            };
            validate_address(&address, "allowed_signer")?;
            Ok(address)
        })
        .collect()
}
