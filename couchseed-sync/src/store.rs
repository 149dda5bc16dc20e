//! The document store as seen by the reconciler.

use couchseed_core::DesignDocument;

/// Design document operations against one database.
///
/// Implementations own the connection; the reconciler never sees URLs,
/// credentials or sessions. Errors are passed through to the caller of
/// [`seed`](crate::seed) untouched.
pub trait DesignStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Every document in the `_design/` namespace, revisions populated.
    fn all_design_docs(&self) -> Result<Vec<DesignDocument>, Self::Error>;

    /// A single document with its current revision.
    fn get_design_doc(&self, id: &str) -> Result<DesignDocument, Self::Error>;

    /// Delete `id` at revision `rev`. A stale revision is a write conflict.
    fn delete_doc(&self, id: &str, rev: &str) -> Result<(), Self::Error>;

    /// Create (empty revision) or update (current revision) a document.
    /// Returns the new revision.
    fn put_design_doc(&self, doc: &DesignDocument) -> Result<String, Self::Error>;
}

impl<T: DesignStore + ?Sized> DesignStore for &T {
    type Error = T::Error;

    fn all_design_docs(&self) -> Result<Vec<DesignDocument>, Self::Error> {
        (**self).all_design_docs()
    }

    fn get_design_doc(&self, id: &str) -> Result<DesignDocument, Self::Error> {
        (**self).get_design_doc(id)
    }

    fn delete_doc(&self, id: &str, rev: &str) -> Result<(), Self::Error> {
        (**self).delete_doc(id, rev)
    }

    fn put_design_doc(&self, doc: &DesignDocument) -> Result<String, Self::Error> {
        (**self).put_design_doc(doc)
    }
}
