//! Pluggable text diffing.
//!
//! Snapshots are opaque text blobs, so diffing is generic over content: no
//! awareness of the editor's document schema. The engine contract is the
//! round-trip property: applying `diff(a, b)` to `a` must reproduce `b`
//! exactly. Granularity of the encoded hunks is up to the engine.

use crate::error::PatchError;

/// A serialized, unidirectional (old -> new) patch between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch(String);

impl Patch {
    /// Wrap already-serialized patch text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The serialized patch text, as sent over the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the patch, yielding its text.
    pub fn into_text(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Patch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Diffing capability used by the sync session.
///
/// Kept as a trait so the encoding strategy can be swapped and the
/// round-trip property verified independently of any one algorithm.
pub trait DiffEngine {
    /// Compute a patch transforming `old` into `new`.
    fn diff(&self, old: &str, new: &str) -> Result<Patch, PatchError>;

    /// Apply a patch to `base`, yielding the new snapshot.
    fn apply(&self, base: &str, patch: &Patch) -> Result<String, PatchError>;
}

/// Default engine: unified-diff text patches via `diffy`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnifiedDiff;

impl DiffEngine for UnifiedDiff {
    fn diff(&self, old: &str, new: &str) -> Result<Patch, PatchError> {
        Ok(Patch::from_text(diffy::create_patch(old, new).to_string()))
    }

    fn apply(&self, base: &str, patch: &Patch) -> Result<String, PatchError> {
        let parsed = diffy::Patch::from_str(patch.as_str())
            .map_err(|e| PatchError::Parse(e.to_string()))?;
        diffy::apply(base, &parsed).map_err(|e| PatchError::Apply(e.to_string()))
    }
}
