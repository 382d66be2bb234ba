//! Last-acknowledged document state.

use smol_str::SmolStr;

/// Opaque backend-assigned document identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId(SmolStr);

impl DocumentId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(SmolStr::new(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(SmolStr::from(id))
    }
}

/// Tracks the snapshot last acknowledged by the backend and the active
/// document identifier.
///
/// Owned by a single [`SyncSession`](crate::SyncSession), created when the
/// editor shell mounts the session and dropped with it. Exactly one document
/// is active per session; create/load overwrite both fields together, and
/// only an acknowledged sync moves the snapshot.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    previous_snapshot: Option<String>,
    document_id: Option<DocumentId>,
}

impl ChangeTracker {
    /// New tracker with both fields empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly created document: the backend-assigned id and the
    /// content that was sent.
    pub fn record_created(&mut self, id: DocumentId, snapshot: String) {
        self.document_id = Some(id);
        self.previous_snapshot = Some(snapshot);
    }

    /// Record a loaded document: the caller-supplied id and the fetched
    /// content.
    pub fn record_loaded(&mut self, id: DocumentId, snapshot: String) {
        self.document_id = Some(id);
        self.previous_snapshot = Some(snapshot);
    }

    /// Overwrite the previous snapshot after the backend acknowledged a sync.
    pub fn mark_synced(&mut self, snapshot: String) {
        self.previous_snapshot = Some(snapshot);
    }

    /// The snapshot last acknowledged by the backend, if any.
    pub fn previous_snapshot(&self) -> Option<&str> {
        self.previous_snapshot.as_deref()
    }

    /// The active document identifier, if any.
    pub fn document_id(&self) -> Option<&DocumentId> {
        self.document_id.as_ref()
    }

    /// True once a create or load has established both fields.
    pub fn is_initialized(&self) -> bool {
        self.previous_snapshot.is_some() && self.document_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_starts_empty() {
        let tracker = ChangeTracker::new();
        assert!(tracker.previous_snapshot().is_none());
        assert!(tracker.document_id().is_none());
        assert!(!tracker.is_initialized());
    }

    #[test]
    fn test_record_created_sets_both() {
        let mut tracker = ChangeTracker::new();
        tracker.record_created("42".into(), "{\"type\":\"doc\"}".to_owned());
        assert_eq!(tracker.document_id().unwrap().as_str(), "42");
        assert_eq!(tracker.previous_snapshot().unwrap(), "{\"type\":\"doc\"}");
        assert!(tracker.is_initialized());
    }

    #[test]
    fn test_mark_synced_moves_snapshot_only() {
        let mut tracker = ChangeTracker::new();
        tracker.record_loaded("7".into(), "old".to_owned());
        tracker.mark_synced("new".to_owned());
        assert_eq!(tracker.previous_snapshot().unwrap(), "new");
        assert_eq!(tracker.document_id().unwrap().as_str(), "7");
    }

    #[test]
    fn test_last_writer_wins() {
        let mut tracker = ChangeTracker::new();
        tracker.record_created("1".into(), "a".to_owned());
        tracker.record_loaded("2".into(), "b".to_owned());
        assert_eq!(tracker.document_id().unwrap().as_str(), "2");
        assert_eq!(tracker.previous_snapshot().unwrap(), "b");
    }
}
