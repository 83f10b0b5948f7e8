//! Syntactic validation of seal fields
//!
//! Stateless shape checks. Each check reports which field failed and why;
//! nothing here verifies a signature cryptographically.

use base64::Engine;
use thiserror::Error;

use super::types::{
    ADDRESS_LEN, MAX_BUSINESS_ID_LEN, MAX_DOC_TYPE_LEN, MAX_HASH_LEN_BYTES, MAX_STUDENT_NAME_LEN,
    MIN_HASH_LEN_BYTES,
};

/// A field failed a validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Name of the offending field
    pub field: String,
    /// Human-readable reason
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Check a hex-encoded hash or signature.
///
/// Returns the decoded byte length on success.
pub fn validate_hash(value: &str, field: &str) -> Result<usize, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(field, format!("{field} cannot be empty")));
    }

    let bytes = hex::decode(value).map_err(|_| {
        ValidationError::new(field, format!("{field} must be valid hex (even-length)"))
    })?;

    let byte_len = bytes.len();
    if !(MIN_HASH_LEN_BYTES..=MAX_HASH_LEN_BYTES).contains(&byte_len) {
        return Err(ValidationError::new(
            field,
            format!(
                "{field} length invalid (bytes: {byte_len}, expected: {MIN_HASH_LEN_BYTES}-{MAX_HASH_LEN_BYTES})"
            ),
        ));
    }

    Ok(byte_len)
}

/// Check a signer address: `G` followed by 55 characters of `[A-Z0-9]`.
pub fn validate_address(value: &str, field: &str) -> Result<(), ValidationError> {
    let well_formed = value.len() == ADDRESS_LEN
        && value.starts_with('G')
        && value
            .bytes()
            .skip(1)
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());

    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            format!("{field} invalid Stellar address"),
        ))
    }
}

/// Check strict standard base64 decoding to 1..=128 bytes.
pub fn validate_base64_len(value: &str, field: &str) -> Result<usize, ValidationError> {
    let invalid = || ValidationError::new(field, format!("{field} invalid base64 or too long"));

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(value)
        .map_err(|_| invalid())?;

    if decoded.is_empty() || decoded.len() > MAX_STUDENT_NAME_LEN {
        return Err(invalid());
    }

    Ok(decoded.len())
}

/// `doc_type` must be non-empty and at most 64 bytes of UTF-8.
pub fn validate_doc_type(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.len() > MAX_DOC_TYPE_LEN {
        return Err(ValidationError::new(
            "doc_type",
            format!("doc_type empty or length invalid (max {MAX_DOC_TYPE_LEN} bytes)"),
        ));
    }
    Ok(())
}

/// `business_id` may be empty but is capped at 64 bytes of UTF-8.
pub fn validate_business_id(value: &str) -> Result<(), ValidationError> {
    if value.len() > MAX_BUSINESS_ID_LEN {
        return Err(ValidationError::new(
            "business_id",
            format!("business_id length invalid (max {MAX_BUSINESS_ID_LEN} bytes)"),
        ));
    }
    Ok(())
}
