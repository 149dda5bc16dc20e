//! Reconciliation against a live store.
//!
//! ## `seed` — phases, strictly in order
//!
//! 1. Fetch all design documents from the store.
//! 2. [`diff`] the desired set against them.
//! 3. Delete each orphan at the revision fetched in step 1.
//! 4. For each change: re-fetch the document, copy its current revision
//!    onto the desired document, put it.
//! 5. Put each addition without a revision.
//!
//! The first error aborts the run and is returned as-is. Writes that already
//! happened are not rolled back.

use couchseed_core::DesignDocument;

use crate::diff::{diff, Difference};
use crate::store::DesignStore;

/// What a completed [`seed`] run wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Deleted ids.
    pub deleted: Vec<String>,
    /// Updated ids with their new revisions.
    pub updated: Vec<(String, String)>,
    /// Created ids with their new revisions.
    pub created: Vec<(String, String)>,
}

impl SeedReport {
    /// True when the store already matched the desired set.
    pub fn is_noop(&self) -> bool {
        self.deleted.is_empty() && self.updated.is_empty() && self.created.is_empty()
    }
}

/// Compute what [`seed`] would do, without writing anything.
pub fn plan<S>(store: &S, desired: &[DesignDocument]) -> Result<Difference, S::Error>
where
    S: DesignStore + ?Sized,
{
    let observed = store.all_design_docs()?;
    Ok(diff(desired, &observed))
}

/// Bring the store's design documents in line with `desired`.
///
/// Running it twice with the same `desired` writes nothing the second time.
pub fn seed<S>(store: &S, desired: &[DesignDocument]) -> Result<SeedReport, S::Error>
where
    S: DesignStore + ?Sized,
{
    let difference = plan(store, desired)?;
    let mut report = SeedReport::default();

    if difference.is_empty() {
        tracing::debug!("design documents up to date ({} desired)", desired.len());
        return Ok(report);
    }

    tracing::info!(
        "seeding design documents: {} to delete, {} to update, {} to create",
        difference.deletions.len(),
        difference.changes.len(),
        difference.additions.len()
    );

    for doc in &difference.deletions {
        store.delete_doc(doc.id(), doc.rev())?;
        tracing::info!("deleted: {}", doc.id());
        report.deleted.push(doc.id().to_string());
    }

    for doc in difference.changes {
        let current = store.get_design_doc(doc.id())?;
        let doc = doc.with_rev(current.rev());
        let rev = store.put_design_doc(&doc)?;
        tracing::info!("updated: {} ({} -> {rev})", doc.id(), current.rev());
        report.updated.push((doc.id().to_string(), rev));
    }

    for doc in &difference.additions {
        let rev = store.put_design_doc(doc)?;
        tracing::info!("created: {} ({rev})", doc.id());
        report.created.push((doc.id().to_string(), rev));
    }

    Ok(report)
}
