//! End-to-end sealing scenarios against the in-memory ledger.

mod common;

use std::sync::Arc;

use docseal_ledger::domain::{NumericInput, SignerType, VerifyQuery};
use docseal_ledger::infra::{verify, InMemorySealLedger, SealErrorKind, SealLedger, VerifyOutcome};

use common::*;

// ============================================================================
// Two-party document lifecycle
// ============================================================================

#[tokio::test]
async fn test_two_party_document_lifecycle() {
    let ledger = InMemorySealLedger::new();
    let doc = hash32(0xd0);
    let (a, b) = (address('A'), address('B'));

    let receipt = ledger
        .seal(opening_seal(&doc, &a, &[&a, &b], 2))
        .await
        .unwrap();
    assert_eq!(receipt.total_records, 1);
    assert_eq!(receipt.record.signer_type, SignerType::Business);
    let policy = receipt.metadata.clone().unwrap();
    assert_eq!(policy.allowed_signers, vec![a.clone(), b.clone()]);
    assert_eq!(policy.max_signers, 2);

    let receipt = ledger.seal(follow_up_seal(&doc, &b, 0)).await.unwrap();
    assert_eq!(receipt.total_records, 2);
    assert_eq!(receipt.metadata, Some(policy.clone()));
    assert_eq!(receipt.record.student_name_b64, "");

    // Policy is full: a repeat by A is a duplicate and an outsider is
    // unauthorized; both are reported before capacity.
    let err = ledger.seal(follow_up_seal(&doc, &a, 1)).await.unwrap_err();
    assert_eq!(err.kind(), SealErrorKind::DuplicateSigner);

    let err = ledger
        .seal(follow_up_seal(&doc, &address('C'), 0))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), SealErrorKind::Forbidden);

    let records = ledger.records(&doc).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].signer, a);
    assert_eq!(records[1].signer, b);
    assert_eq!(ledger.policy(&doc).await.unwrap(), Some(policy));
}

#[tokio::test]
async fn test_same_signer_twice_is_rejected_once() {
    let ledger = InMemorySealLedger::new();
    let doc = hash32(0xd1);
    let (a, b) = (address('A'), address('B'));

    ledger
        .seal(opening_seal(&doc, &a, &[&a, &b], 3))
        .await
        .unwrap();
    ledger.seal(follow_up_seal(&doc, &b, 0)).await.unwrap();

    let err = ledger.seal(follow_up_seal(&doc, &b, 0)).await.unwrap_err();
    assert_eq!(err.kind(), SealErrorKind::DuplicateSigner);
    assert_eq!(ledger.records(&doc).await.unwrap().len(), 2);
}

// ============================================================================
// First-seal gating
// ============================================================================

#[tokio::test]
async fn test_first_seal_gating() {
    let ledger = InMemorySealLedger::new();
    let doc = hash32(0xd2);
    let (a, b) = (address('A'), address('B'));

    let mut student_opener = opening_seal(&doc, &a, &[&a, &b], 2);
    student_opener.signer_type = NumericInput::Integer(0);
    let err = ledger.seal(student_opener).await.unwrap_err();
    assert_eq!(err.kind(), SealErrorKind::PolicyViolation);

    let mut nameless = opening_seal(&doc, &a, &[&a, &b], 2);
    nameless.student_name_b64 = String::new();
    let err = ledger.seal(nameless).await.unwrap_err();
    assert_eq!(err.kind(), SealErrorKind::PolicyViolation);

    let err = ledger
        .seal(opening_seal(&doc, &a, &[&b], 2))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), SealErrorKind::PolicyViolation);

    let err = ledger
        .seal(opening_seal(&doc, &a, &[&a, &b], 1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), SealErrorKind::PolicyViolation);

    // Nothing above opened the document.
    assert_eq!(ledger.policy(&doc).await.unwrap(), None);
    assert!(ledger.records(&doc).await.unwrap().is_empty());
    assert!(!ledger.summary(&doc).await.unwrap().exists);
}

#[tokio::test]
async fn test_subsequent_seal_with_student_name_is_rejected() {
    let ledger = InMemorySealLedger::new();
    let doc = hash32(0xd3);
    let (a, b) = (address('A'), address('B'));

    ledger
        .seal(opening_seal(&doc, &a, &[&a, &b], 2))
        .await
        .unwrap();

    let mut renamed = follow_up_seal(&doc, &b, 0);
    renamed.student_name_b64 = student_name();
    let err = ledger.seal(renamed).await.unwrap_err();
    assert_eq!(err.kind(), SealErrorKind::PolicyViolation);
}

#[tokio::test]
async fn test_policy_fields_ignored_after_opening() {
    let ledger = InMemorySealLedger::new();
    let doc = hash32(0xd4);
    let (a, b, c) = (address('A'), address('B'), address('C'));

    ledger
        .seal(opening_seal(&doc, &a, &[&a, &b], 2))
        .await
        .unwrap();

    let mut widened = follow_up_seal(&doc, &c, 0);
    widened.allowed_signers = Some(serde_json::json!([c.clone()]));
    widened.max_signers = NumericInput::Integer(5);
    let err = ledger.seal(widened).await.unwrap_err();
    assert_eq!(err.kind(), SealErrorKind::Forbidden);

    let policy = ledger.policy(&doc).await.unwrap().unwrap();
    assert_eq!(policy.allowed_signers, vec![a, b]);
    assert_eq!(policy.max_signers, 2);
}

// ============================================================================
// Capacity
// ============================================================================

#[tokio::test]
async fn test_global_cap_before_authorization() {
    let ledger = InMemorySealLedger::new();
    let doc = hash32(0xd5);

    let signers: Vec<String> = "ABCDEFGHIJKL".chars().map(address).collect();
    let allowed: Vec<&str> = signers.iter().map(String::as_str).collect();

    ledger
        .seal(opening_seal(&doc, &signers[0], &allowed, 12))
        .await
        .unwrap();
    for signer in &signers[1..10] {
        ledger.seal(follow_up_seal(&doc, signer, 0)).await.unwrap();
    }
    assert_eq!(ledger.records(&doc).await.unwrap().len(), 10);

    let err = ledger
        .seal(follow_up_seal(&doc, &signers[10], 0))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), SealErrorKind::LimitExceeded);

    // An outsider also sees the cap first.
    let err = ledger
        .seal(follow_up_seal(&doc, &address('Z'), 0))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), SealErrorKind::LimitExceeded);
}

#[tokio::test]
async fn test_concurrent_seals_never_exceed_policy() {
    let ledger = Arc::new(InMemorySealLedger::new());
    let doc = hash32(0xd6);

    let signers: Vec<String> = "ABCDEF".chars().map(address).collect();
    let allowed: Vec<&str> = signers.iter().map(String::as_str).collect();
    ledger
        .seal(opening_seal(&doc, &signers[0], &allowed, 6))
        .await
        .unwrap();

    // Every non-opening signer races twice; exactly one attempt each wins.
    let mut handles = Vec::new();
    for signer in signers[1..].iter().chain(signers[1..].iter()) {
        let ledger = ledger.clone();
        let doc = doc.clone();
        let signer = signer.clone();
        handles.push(tokio::spawn(async move {
            ledger.seal(follow_up_seal(&doc, &signer, 0)).await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(err) => assert_eq!(err.kind(), SealErrorKind::DuplicateSigner),
        }
    }

    assert_eq!(accepted, 5);
    let records = ledger.records(&doc).await.unwrap();
    assert_eq!(records.len(), 6);
    assert!(records.len() <= 6);
}

// ============================================================================
// Queries
// ============================================================================

#[tokio::test]
async fn test_unknown_document_queries() {
    let ledger = InMemorySealLedger::new();
    let doc = hash32(0xee);

    let outcome = verify(&ledger, VerifyQuery::Metadata { doc_hash: doc.clone() })
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Metadata(None));

    let outcome = verify(&ledger, VerifyQuery::Records { doc_hash: doc.clone() })
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Records(Vec::new()));

    let err = verify(&ledger, VerifyQuery::DocVerify { doc_hash: doc })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), SealErrorKind::NotFound);
}

#[tokio::test]
async fn test_signer_and_vc_queries_span_documents() {
    let ledger = InMemorySealLedger::new();
    let (a, b) = (address('A'), address('B'));
    let (doc1, doc2) = (hash32(0x01), hash32(0x02));

    ledger
        .seal(opening_seal(&doc1, &a, &[&a, &b], 2))
        .await
        .unwrap();
    ledger
        .seal(opening_seal(&doc2, &a, &[&a], 1))
        .await
        .unwrap();
    ledger.seal(follow_up_seal(&doc1, &b, 0)).await.unwrap();

    let outcome = verify(&ledger, VerifyQuery::Signer { signer: a.clone() })
        .await
        .unwrap();
    let VerifyOutcome::Records(records) = outcome else {
        panic!("expected records");
    };
    let docs: Vec<&str> = records.iter().map(|r| r.doc_hash.as_str()).collect();
    assert_eq!(docs, vec![doc1.as_str(), doc2.as_str()]);

    let outcome = verify(&ledger, VerifyQuery::Vc { vc_hash: hash32(0x22) })
        .await
        .unwrap();
    assert!(matches!(outcome, VerifyOutcome::Records(ref r) if r.len() == 3));

    let outcome = verify(&ledger, VerifyQuery::Vc { vc_hash: hash32(0x99) })
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Records(Vec::new()));

    let stats = ledger.stats().await.unwrap();
    assert_eq!(stats.documents, 2);
    assert_eq!(stats.seals, 3);
}
