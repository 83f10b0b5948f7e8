//! Verification queries over the seal ledger
//!
//! Maps a `mode` plus its parameter onto a ledger read. `doc_verify` is the
//! strict lookup (hash shape checked, empty ledger is `NotFound`); `records`
//! is the raw one (no checks, empty ledger is an empty list). Both behaviors
//! are relied on by existing clients.

use serde::Serialize;
use tracing::instrument;

use crate::domain::validation::validate_hash;
use crate::domain::{DocumentPolicy, SealRecord, VerifyQuery, VerifyRequest};

use super::{Result, SealError, SealLedger};

/// Result of a verification query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyOutcome {
    Records(Vec<SealRecord>),
    Metadata(Option<DocumentPolicy>),
}

impl TryFrom<VerifyRequest> for VerifyQuery {
    type Error = SealError;

    fn try_from(request: VerifyRequest) -> Result<Self> {
        let required = |value: String, field: &str| {
            if value.is_empty() {
                Err(SealError::invalid_input(format!("{field} required")))
            } else {
                Ok(value)
            }
        };

        match request.mode.as_ref().and_then(serde_json::Value::as_str) {
            Some("doc_verify") => Ok(VerifyQuery::DocVerify {
                doc_hash: required(request.doc_hash, "doc_hash")?,
            }),
            Some("records") => Ok(VerifyQuery::Records {
                doc_hash: required(request.doc_hash, "doc_hash")?,
            }),
            Some("metadata") => Ok(VerifyQuery::Metadata {
                doc_hash: required(request.doc_hash, "doc_hash")?,
            }),
            Some("signer") => Ok(VerifyQuery::Signer {
                signer: required(request.signer, "signer")?,
            }),
            Some("vc") => Ok(VerifyQuery::Vc {
                vc_hash: required(request.vc_hash, "vc_hash")?,
            }),
            _ => Err(SealError::invalid_input("invalid mode")),
        }
    }
}

/// Run a verification query
#[instrument(skip(ledger), fields(mode = query.mode()))]
pub async fn verify<L>(ledger: &L, query: VerifyQuery) -> Result<VerifyOutcome>
where
    L: SealLedger + ?Sized,
{
    match query {
        VerifyQuery::DocVerify { doc_hash } => {
            validate_hash(&doc_hash, "doc_hash")?;
            let records = ledger.records(&doc_hash).await?;
            if records.is_empty() {
                return Err(SealError::NotFound(
                    "No records found for this doc_hash".to_string(),
                ));
            }
            Ok(VerifyOutcome::Records(records))
        }
        VerifyQuery::Records { doc_hash } => {
            Ok(VerifyOutcome::Records(ledger.records(&doc_hash).await?))
        }
        VerifyQuery::Metadata { doc_hash } => {
            Ok(VerifyOutcome::Metadata(ledger.policy(&doc_hash).await?))
        }
        VerifyQuery::Signer { signer } => Ok(VerifyOutcome::Records(
            ledger.records_by_signer(&signer).await?,
        )),
        VerifyQuery::Vc { vc_hash } => Ok(VerifyOutcome::Records(
            ledger.records_by_vc_hash(&vc_hash).await?,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SignerType;
    use crate::infra::{MockSealLedger, SealErrorKind};
    use serde_json::json;

    fn record(doc_hash: &str) -> SealRecord {
        SealRecord {
            doc_hash: doc_hash.to_string(),
            signature: "11".repeat(32),
            signer: format!("G{}", "Q".repeat(55)),
            doc_type: "diploma".to_string(),
            timestamp: 1_700_000_000,
            signer_type: SignerType::Business,
            vc_hash: "22".repeat(32),
            business_id: String::new(),
            student_name_b64: "QWRh".to_string(),
        }
    }

    fn request(mode: &str) -> VerifyRequest {
        VerifyRequest {
            mode: Some(json!(mode)),
            doc_hash: "ab".repeat(32),
            signer: format!("G{}", "Q".repeat(55)),
            vc_hash: "22".repeat(32),
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(
            VerifyQuery::try_from(request("records")).unwrap(),
            VerifyQuery::Records {
                doc_hash: "ab".repeat(32)
            }
        );
        assert_eq!(
            VerifyQuery::try_from(request("vc")).unwrap().mode(),
            "vc"
        );

        let err = VerifyQuery::try_from(request("everything")).unwrap_err();
        assert_eq!(err, SealError::invalid_input("invalid mode"));

        let err = VerifyQuery::try_from(VerifyRequest::default()).unwrap_err();
        assert_eq!(err.kind(), SealErrorKind::InvalidInput);
    }

    #[test]
    fn test_mode_must_match_exactly() {
        for mode in [json!(" records"), json!("Records"), json!(5), json!(null), json!(["vc"])] {
            let req = VerifyRequest {
                mode: Some(mode),
                ..request("records")
            };
            assert_eq!(
                VerifyQuery::try_from(req).unwrap_err(),
                SealError::invalid_input("invalid mode")
            );
        }
    }

    #[test]
    fn test_mode_requires_its_parameter() {
        let mut req = request("signer");
        req.signer = String::new();
        assert_eq!(
            VerifyQuery::try_from(req).unwrap_err(),
            SealError::invalid_input("signer required")
        );

        let mut req = request("metadata");
        req.doc_hash = String::new();
        assert_eq!(
            VerifyQuery::try_from(req).unwrap_err(),
            SealError::invalid_input("doc_hash required")
        );
    }

    #[tokio::test]
    async fn test_doc_verify_not_found_when_empty() {
        let mut ledger = MockSealLedger::new();
        ledger.expect_records().returning(|_| Ok(Vec::new()));

        let err = verify(
            &ledger,
            VerifyQuery::DocVerify {
                doc_hash: "ab".repeat(32),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), SealErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_doc_verify_validates_before_reading() {
        let mut ledger = MockSealLedger::new();
        ledger.expect_records().never();

        let err = verify(
            &ledger,
            VerifyQuery::DocVerify {
                doc_hash: "abc".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), SealErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_records_mode_skips_validation() {
        let mut ledger = MockSealLedger::new();
        ledger
            .expect_records()
            .withf(|doc_hash| doc_hash.to_string() == "not-a-hash")
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let outcome = verify(
            &ledger,
            VerifyQuery::Records {
                doc_hash: "not-a-hash".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(outcome, VerifyOutcome::Records(Vec::new()));
    }

    #[tokio::test]
    async fn test_doc_verify_returns_records() {
        let doc_hash = "ab".repeat(32);
        let expected = vec![record(&doc_hash)];
        let returned = expected.clone();

        let mut ledger = MockSealLedger::new();
        ledger
            .expect_records()
            .returning(move |_| Ok(returned.clone()));

        let outcome = verify(&ledger, VerifyQuery::DocVerify { doc_hash })
            .await
            .unwrap();
        assert_eq!(outcome, VerifyOutcome::Records(expected));
    }

    #[tokio::test]
    async fn test_metadata_and_cross_document_modes() {
        let mut ledger = MockSealLedger::new();
        ledger.expect_policy().returning(|_| Ok(None));
        ledger
            .expect_records_by_signer()
            .times(1)
            .returning(|_| Ok(vec![record("x")]));
        ledger
            .expect_records_by_vc_hash()
            .times(1)
            .returning(|_| Ok(vec![record("y"), record("z")]));

        let outcome = verify(
            &ledger,
            VerifyQuery::Metadata {
                doc_hash: "unknown".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(outcome, VerifyOutcome::Metadata(None));

        let outcome = verify(
            &ledger,
            VerifyQuery::Signer {
                signer: "G".to_string(),
            },
        )
        .await
        .unwrap();
        assert!(matches!(outcome, VerifyOutcome::Records(ref r) if r.len() == 1));

        let outcome = verify(
            &ledger,
            VerifyQuery::Vc {
                vc_hash: "22".to_string(),
            },
        )
        .await
        .unwrap();
        assert!(matches!(outcome, VerifyOutcome::Records(ref r) if r.len() == 2));
    }
}
