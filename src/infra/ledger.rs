//! In-memory seal ledger
//!
//! Holds every document's policy and seals for the lifetime of the process.
//!
//! # Locking
//!
//! Each document hash owns a `Mutex<DocumentState>`. The outer map is behind
//! an `RwLock` that is held only to find or create a document's slot:
//!
//! ```text
//! seal(doc):  map.read  -> slot?  (miss: map.write -> insert slot)
//!             slot.lock -> admit -> append -> unlock
//! ```
//!
//! Admission and append for one document are serialized by its mutex, so two
//! seals can never both see spare capacity or both open the policy. Seals on
//! different documents only contend on the brief map lookup.
//!
//! A rejected first seal releases the empty slot it created, so failed
//! openers leave nothing behind.
//!
//! Cross-document queries walk documents in the order they were opened (first
//! accepted seal) and lock each one just long enough to copy out matches.
//! Opening records the hash while still holding the document's mutex; no path
//! takes a document mutex while holding the map lock, so this cannot deadlock.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument};

use crate::domain::{
    DocumentPolicy, DocumentSummary, LedgerStats, SealReceipt, SealRecord, SealRequest,
};

use super::admission::{check_request, DocumentState};
use super::{Result, SealLedger};

type DocumentSlot = Arc<Mutex<DocumentState>>;

#[derive(Default)]
struct Documents {
    slots: HashMap<String, DocumentSlot>,
    /// Opened hashes in first-seal order, for stable cross-document queries.
    order: Vec<String>,
}

/// Process-lifetime seal ledger with per-document locking
pub struct InMemorySealLedger {
    documents: RwLock<Documents>,
}

impl InMemorySealLedger {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Documents::default()),
        }
    }

    async fn slot(&self, doc_hash: &str) -> Option<DocumentSlot> {
        self.documents.read().await.slots.get(doc_hash).cloned()
    }

    async fn slot_or_insert(&self, doc_hash: &str) -> DocumentSlot {
        if let Some(slot) = self.slot(doc_hash).await {
            return slot;
        }

        let mut documents = self.documents.write().await;
        if let Some(slot) = documents.slots.get(doc_hash) {
            return slot.clone();
        }

        let slot = DocumentSlot::default();
        documents.slots.insert(doc_hash.to_string(), slot.clone());
        slot
    }

    /// Drop a slot left empty by a rejected opener.
    ///
    /// Only removed when no other caller holds the slot; a waiting seal may
    /// still open the document through it.
    async fn release_if_vacant(&self, doc_hash: &str, slot: DocumentSlot) {
        let mut documents = self.documents.write().await;
        let vacant = match documents.slots.get(doc_hash) {
            Some(current) => {
                Arc::ptr_eq(current, &slot)
                    && Arc::strong_count(&slot) == 2
                    && slot.try_lock().map(|state| state.is_empty()).unwrap_or(false)
            }
            None => false,
        };
        if vacant {
            documents.slots.remove(doc_hash);
        }
    }

    /// Consistent copy of one document; unknown hashes read as empty.
    async fn snapshot(&self, doc_hash: &str) -> DocumentState {
        match self.slot(doc_hash).await {
            Some(slot) => {
                let state = slot.lock().await;
                state.clone()
            }
            None => DocumentState::default(),
        }
    }

    async fn all_slots(&self) -> Vec<DocumentSlot> {
        let documents = self.documents.read().await;
        documents
            .order
            .iter()
            .filter_map(|hash| documents.slots.get(hash).cloned())
            .collect()
    }

    async fn collect_matching<F>(&self, predicate: F) -> Vec<SealRecord>
    where
        F: Fn(&SealRecord) -> bool,
    {
        let mut matched = Vec::new();
        for slot in self.all_slots().await {
            let state = slot.lock().await;
            matched.extend(state.records.iter().filter(|r| predicate(r)).cloned());
        }
        matched
    }
}

impl Default for InMemorySealLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SealLedger for InMemorySealLedger {
    #[instrument(skip(self, request), fields(doc_hash = %request.doc_hash, signer = %request.signer))]
    async fn seal(&self, request: SealRequest) -> Result<SealReceipt> {
        let seal = check_request(request)?;

        let slot = self.slot_or_insert(&seal.doc_hash).await;
        let mut state = slot.lock().await;

        let admission = match state.admit(&seal) {
            Ok(admission) => admission,
            Err(err) => {
                let vacant = state.is_empty();
                drop(state);
                if vacant {
                    self.release_if_vacant(&seal.doc_hash, slot).await;
                }
                return Err(err);
            }
        };
        let opens_document = admission.opens_document;

        let timestamp = Utc::now().timestamp().max(0) as u64;
        let record = seal.into_record(timestamp);
        let total_records = state.commit(admission, record.clone());

        if opens_document {
            self.documents.write().await.order.push(record.doc_hash.clone());
            info!(total_records, "Document opened");
        } else {
            info!(total_records, "Seal appended");
        }

        Ok(SealReceipt {
            total_records,
            doc_hash: record.doc_hash.clone(),
            metadata: state.policy.clone(),
            record,
        })
    }

    async fn records(&self, doc_hash: &str) -> Result<Vec<SealRecord>> {
        Ok(self.snapshot(doc_hash).await.records)
    }

    async fn policy(&self, doc_hash: &str) -> Result<Option<DocumentPolicy>> {
        Ok(self.snapshot(doc_hash).await.policy)
    }

    #[instrument(skip(self))]
    async fn records_by_signer(&self, signer: &str) -> Result<Vec<SealRecord>> {
        Ok(self.collect_matching(|r| r.signer == signer).await)
    }

    #[instrument(skip(self))]
    async fn records_by_vc_hash(&self, vc_hash: &str) -> Result<Vec<SealRecord>> {
        Ok(self.collect_matching(|r| r.vc_hash == vc_hash).await)
    }

    async fn summary(&self, doc_hash: &str) -> Result<DocumentSummary> {
        let state = self.snapshot(doc_hash).await;

        Ok(DocumentSummary {
            doc_hash: doc_hash.to_string(),
            exists: !state.records.is_empty(),
            total_records: state.records.len(),
            metadata: state.policy,
        })
    }

    async fn stats(&self) -> Result<LedgerStats> {
        let mut stats = LedgerStats::default();
        for slot in self.all_slots().await {
            let state = slot.lock().await;
            if !state.records.is_empty() {
                stats.documents += 1;
                stats.seals += state.records.len();
            }
        }
        Ok(stats)
    }
}
