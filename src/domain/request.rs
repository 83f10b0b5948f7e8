//! Inbound request shapes for sealing and verification
//!
//! Fields arrive loosely typed from JSON. String fields are trimmed and
//! default to empty; numeric fields keep their raw form in [`NumericInput`]
//! until the sealing path coerces them, so that a bad `max_signers` only
//! matters on the seal that actually reads it.

use serde::{Deserialize, Deserializer, Serialize};

/// A numeric field as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl NumericInput {
    /// Coerce to an integer.
    ///
    /// Integers pass through and finite floats truncate toward zero. Strings
    /// must hold an integer after trimming; `"1.0"` is non-numeric.
    pub fn to_integer(&self) -> Option<i64> {
        match self {
            NumericInput::Integer(v) => Some(*v),
            NumericInput::Float(f) => truncate(*f),
            NumericInput::Text(s) => s.trim().parse::<i64>().ok(),
            NumericInput::Other(_) => None,
        }
    }
}

fn truncate(f: f64) -> Option<i64> {
    if f.is_finite() && f.abs() < i64::MAX as f64 {
        Some(f.trunc() as i64)
    } else {
        None
    }
}

impl Default for NumericInput {
    fn default() -> Self {
        NumericInput::Integer(0)
    }
}

impl From<i64> for NumericInput {
    fn from(v: i64) -> Self {
        NumericInput::Integer(v)
    }
}

impl From<&str> for NumericInput {
    fn from(v: &str) -> Self {
        NumericInput::Text(v.to_string())
    }
}

/// A request to seal a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SealRequest {
    #[serde(default, deserialize_with = "trimmed_string")]
    pub doc_hash: String,
    #[serde(default, deserialize_with = "trimmed_string")]
    pub signature: String,
    #[serde(default, deserialize_with = "trimmed_string")]
    pub signer: String,
    #[serde(default, deserialize_with = "trimmed_string")]
    pub doc_type: String,
    #[serde(default)]
    pub signer_type: NumericInput,
    #[serde(default, deserialize_with = "trimmed_string")]
    pub vc_hash: String,
    #[serde(default, deserialize_with = "trimmed_string")]
    pub business_id: String,
    #[serde(default, deserialize_with = "trimmed_string")]
    pub student_name_b64: String,
    /// Read only when the seal opens the document.
    #[serde(default)]
    pub allowed_signers: Option<serde_json::Value>,
    /// Read only when the seal opens the document.
    #[serde(default)]
    pub max_signers: NumericInput,
}

/// Query modes accepted by verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyQuery {
    /// Validated lookup of a document's seals; empty is an error.
    DocVerify { doc_hash: String },
    /// Raw lookup of a document's seals; empty is an empty list.
    Records { doc_hash: String },
    /// A document's policy, if any.
    Metadata { doc_hash: String },
    /// Every seal made by a signer.
    Signer { signer: String },
    /// Every seal carrying a credential hash.
    Vc { vc_hash: String },
}

impl VerifyQuery {
    pub fn mode(&self) -> &'static str {
        match self {
            VerifyQuery::DocVerify { .. } => "doc_verify",
            VerifyQuery::Records { .. } => "records",
            VerifyQuery::Metadata { .. } => "metadata",
            VerifyQuery::Signer { .. } => "signer",
            VerifyQuery::Vc { .. } => "vc",
        }
    }
}

/// Raw verification request before mode dispatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifyRequest {
    /// Any JSON value; only the exact mode strings are recognized.
    #[serde(default)]
    pub mode: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "trimmed_string")]
    pub doc_hash: String,
    #[serde(default, deserialize_with = "trimmed_string")]
    pub signer: String,
    #[serde(default, deserialize_with = "trimmed_string")]
    pub vc_hash: String,
}

/// Accept any JSON scalar for a text field; strings are trimmed, null is empty,
/// other values use their JSON rendering.
fn trimmed_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}
