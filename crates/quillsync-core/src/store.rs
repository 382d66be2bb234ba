//! Backend document store capability.

use std::future::Future;

use crate::error::SyncError;
use crate::patch::Patch;
use crate::tracker::DocumentId;

/// The three backend operations the sync session consumes.
///
/// The production implementation is the HTTP client in `quillsync-client`;
/// tests substitute in-memory stores. All calls are best-effort: a non-success
/// result means the caller skips its state update, nothing is retried.
pub trait DocumentStore {
    /// Create a document from its serialized content, returning the
    /// backend-assigned identifier.
    fn create(&self, content: &str) -> impl Future<Output = Result<DocumentId, SyncError>> + Send;

    /// Fetch a document's serialized content.
    fn fetch(&self, id: &DocumentId) -> impl Future<Output = Result<String, SyncError>> + Send;

    /// Apply a patch to a document. Only the status matters; any response
    /// body is ignored.
    fn apply_patch(
        &self,
        id: &DocumentId,
        patch: &Patch,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;
}
