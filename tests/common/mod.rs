//! Common test utilities and fixtures for integration tests

#![allow(dead_code)]

use serde_json::json;

use docseal_ledger::domain::{NumericInput, SealRequest};

/// Signer address made of `G` followed by 55 copies of `c`
pub fn address(c: char) -> String {
    format!("G{}", c.to_string().repeat(55))
}

/// 32-byte hex hash built from a repeated byte
pub fn hash32(byte: u8) -> String {
    hex::encode([byte; 32])
}

/// Base64 of a student name
pub fn student_name() -> String {
    "QWRhIExvdmVsYWNl".to_string()
}

/// A business seal that opens `doc_hash` with the given policy
pub fn opening_seal<S: AsRef<str>>(
    doc_hash: &str,
    signer: &str,
    allowed: &[S],
    max_signers: i64,
) -> SealRequest {
    let allowed: Vec<&str> = allowed.iter().map(<S as AsRef<str>>::as_ref).collect();
    SealRequest {
        doc_hash: doc_hash.to_string(),
        signature: hash32(0x11),
        signer: signer.to_string(),
        doc_type: "diploma".to_string(),
        signer_type: NumericInput::Integer(1),
        vc_hash: hash32(0x22),
        business_id: "univ-001".to_string(),
        student_name_b64: student_name(),
        allowed_signers: Some(json!(allowed)),
        max_signers: NumericInput::Integer(max_signers),
    }
}

/// A follow-up seal on an already opened document
pub fn follow_up_seal(doc_hash: &str, signer: &str, signer_type: i64) -> SealRequest {
    SealRequest {
        doc_hash: doc_hash.to_string(),
        signature: hash32(0x33),
        signer: signer.to_string(),
        doc_type: "diploma".to_string(),
        signer_type: NumericInput::Integer(signer_type),
        vc_hash: hash32(0x22),
        business_id: String::new(),
        student_name_b64: String::new(),
        allowed_signers: None,
        max_signers: NumericInput::Integer(0),
    }
}

/// JSON body of an opening seal, as a client would post it
pub fn opening_seal_json<S: AsRef<str>>(
    doc_hash: &str,
    signer: &str,
    allowed: &[S],
    max_signers: i64,
) -> serde_json::Value {
    let allowed: Vec<&str> = allowed.iter().map(<S as AsRef<str>>::as_ref).collect();
    json!({
        "doc_hash": doc_hash,
        "signature": hash32(0x11),
        "signer": signer,
        "doc_type": "diploma",
        "signer_type": 1,
        "vc_hash": hash32(0x22),
        "business_id": "univ-001",
        "student_name_b64": student_name(),
        "allowed_signers": allowed,
        "max_signers": max_signers,
    })
}

/// JSON body of a follow-up seal
pub fn follow_up_seal_json(doc_hash: &str, signer: &str, signer_type: i64) -> serde_json::Value {
    json!({
        "doc_hash": doc_hash,
        "signature": hash32(0x33),
        "signer": signer,
        "doc_type": "diploma",
        "signer_type": signer_type,
        "vc_hash": hash32(0x22),
    })
}
