//! In-process [`DesignStore`] with server-like revision rules.
//!
//! Revisions look like `<generation>-<32 hex chars>` where the hex part is a
//! SHA-256 prefix of the stored body. Writes with a stale or missing
//! revision fail with [`MemoryStoreError::Conflict`].
//!
//! Every call through the trait is appended to a journal so tests can assert
//! exactly which operations ran, and in what order.

use std::cell::RefCell;
use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use thiserror::Error;

use couchseed_core::DesignDocument;

use crate::store::DesignStore;

/// One call made through [`DesignStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    AllDesignDocs,
    Get { id: String },
    Delete { id: String, rev: String },
    /// `rev` is the revision the caller supplied (empty for a create).
    Put { id: String, rev: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryStoreError {
    #[error("document not found: {id}")]
    NotFound { id: String },

    #[error("document update conflict: {id}")]
    Conflict { id: String },

    #[error("injected failure on {op:?}")]
    Injected { op: StoreOp },
}

type FailWhen = Box<dyn Fn(&StoreOp) -> bool>;

#[derive(Default)]
struct State {
    docs: BTreeMap<String, DesignDocument>,
    journal: Vec<StoreOp>,
}

/// Single-threaded in-memory design document store.
#[derive(Default)]
pub struct MemoryStore {
    state: RefCell<State>,
    fail_when: Option<FailWhen>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `doc` directly (not journaled), assigning a fresh revision.
    /// Any revision on `doc` is ignored. Returns the stored revision.
    pub fn insert(&self, doc: DesignDocument) -> String {
        let mut state = self.state.borrow_mut();
        let current_gen = state
            .docs
            .get(doc.id())
            .map(|d| generation(d.rev()))
            .unwrap_or(0);
        let stored = with_next_rev(doc, current_gen);
        let rev = stored.rev().to_string();
        state.docs.insert(stored.id().to_string(), stored);
        rev
    }

    /// Fail every journaled operation for which `predicate` holds.
    /// The failing operation is still journaled; it has no effect.
    pub fn fail_when(mut self, predicate: impl Fn(&StoreOp) -> bool + 'static) -> Self {
        self.fail_when = Some(Box::new(predicate));
        self
    }

    /// Snapshot of stored documents in id order.
    pub fn docs(&self) -> Vec<DesignDocument> {
        self.state.borrow().docs.values().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<DesignDocument> {
        self.state.borrow().docs.get(id).cloned()
    }

    pub fn journal(&self) -> Vec<StoreOp> {
        self.state.borrow().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.state.borrow_mut().journal.clear();
    }

    /// Number of journaled writes (puts and deletes).
    pub fn write_count(&self) -> usize {
        self.state
            .borrow()
            .journal
            .iter()
            .filter(|op| matches!(op, StoreOp::Put { .. } | StoreOp::Delete { .. }))
            .count()
    }

    fn record(&self, op: StoreOp) -> Result<(), MemoryStoreError> {
        let fail = self.fail_when.as_ref().is_some_and(|f| f(&op));
        self.state.borrow_mut().journal.push(op.clone());
        if fail {
            return Err(MemoryStoreError::Injected { op });
        }
        Ok(())
    }
}

impl DesignStore for MemoryStore {
    type Error = MemoryStoreError;

    fn all_design_docs(&self) -> Result<Vec<DesignDocument>, Self::Error> {
        self.record(StoreOp::AllDesignDocs)?;
        Ok(self.docs())
    }

    fn get_design_doc(&self, id: &str) -> Result<DesignDocument, Self::Error> {
        self.record(StoreOp::Get { id: id.to_string() })?;
        self.get(id)
            .ok_or_else(|| MemoryStoreError::NotFound { id: id.to_string() })
    }

    fn delete_doc(&self, id: &str, rev: &str) -> Result<(), Self::Error> {
        self.record(StoreOp::Delete {
            id: id.to_string(),
            rev: rev.to_string(),
        })?;
        let mut state = self.state.borrow_mut();
        let current_rev = state.docs.get(id).map(|d| d.rev().to_string());
        match current_rev {
            None => Err(MemoryStoreError::NotFound { id: id.to_string() }),
            Some(current) if current != rev => {
                Err(MemoryStoreError::Conflict { id: id.to_string() })
            }
            Some(_) => {
                state.docs.remove(id);
                tracing::debug!("memory store: deleted {id}");
                Ok(())
            }
        }
    }

    fn put_design_doc(&self, doc: &DesignDocument) -> Result<String, Self::Error> {
        self.record(StoreOp::Put {
            id: doc.id().to_string(),
            rev: doc.rev().to_string(),
        })?;
        let mut state = self.state.borrow_mut();
        let current_rev = state.docs.get(doc.id()).map(|d| d.rev().to_string());
        let current_gen = match current_rev {
            None if doc.rev().is_empty() => 0,
            Some(current) if current == doc.rev() => generation(&current),
            _ => {
                return Err(MemoryStoreError::Conflict {
                    id: doc.id().to_string(),
                })
            }
        };
        let stored = with_next_rev(doc.clone(), current_gen);
        let rev = stored.rev().to_string();
        state.docs.insert(stored.id().to_string(), stored);
        tracing::debug!("memory store: wrote {} at {rev}", doc.id());
        Ok(rev)
    }
}

fn generation(rev: &str) -> u64 {
    rev.split_once('-')
        .and_then(|(n, _)| n.parse().ok())
        .unwrap_or(0)
}

fn with_next_rev(mut doc: DesignDocument, generation: u64) -> DesignDocument {
    doc.set_rev("");
    let body = serde_json::to_vec(&doc).unwrap_or_default();
    let digest = {
        let mut h = Sha256::new();
        h.update(&body);
        hex::encode(h.finalize())
    };
    doc.set_rev(format!("{}-{}", generation + 1, &digest[..32]));
    doc
}
