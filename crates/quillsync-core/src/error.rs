//! Error types for diffing and sync operations.

use thiserror::Error;

/// Errors from a [`DiffEngine`](crate::DiffEngine) implementation.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PatchError {
    /// Patch text could not be parsed.
    #[error("failed to parse patch: {0}")]
    Parse(String),

    /// Patch did not apply cleanly to the given base.
    #[error("failed to apply patch: {0}")]
    Apply(String),

    /// Diff computation failed.
    #[error("failed to compute diff: {0}")]
    Diff(String),
}

/// Errors from sync operations against the backend.
///
/// Nothing here is fatal to the process; each failure is scoped to the
/// operation that triggered it. A failed sync leaves the tracked snapshot
/// untouched so the next edit diffs against the last acknowledged state.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SyncError {
    /// Backend returned a non-success status.
    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    /// Transport-level failure (connection refused, reset, etc.).
    #[error("transport error: {0}")]
    Transport(String),

    /// Backend body could not be decoded as expected.
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    /// An edit arrived before any create or load established a base snapshot.
    #[error("no base snapshot; create or load a document first")]
    UninitializedBase,

    /// No document identifier is tracked for this session.
    #[error("no document id; create or load a document first")]
    MissingDocument,

    /// Diff/patch failure.
    #[error(transparent)]
    Patch(#[from] PatchError),
}
