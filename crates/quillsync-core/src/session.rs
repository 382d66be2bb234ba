//! The sync session: edit notifications in, debounced patches out.
//!
//! ## Flow
//!
//! 1. **Create or load** establishes the tracked base snapshot and document
//!    identifier.
//! 2. Every **edit notification** diffs the new snapshot against the tracked
//!    base eagerly and (re-)arms the debounce machine. Edits inside one
//!    quiescence window displace each other; only the last survives.
//! 3. When the window elapses the captured patch is sent. On success the
//!    tracked base moves to the patch's new side; on failure it stays put
//!    and the failure is only logged. No retry, no backoff.
//!
//! The session is a single-owner object: one task drives it, the only
//! suspension points are store calls and the debounce sleep. An in-flight
//! store call is never cancelled by a newer edit; only the armed deadline
//! is replaced.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::debounce::{Debounce, PendingSync};
use crate::error::SyncError;
use crate::patch::{DiffEngine, UnifiedDiff};
use crate::store::DocumentStore;
use crate::tracker::{ChangeTracker, DocumentId};

/// Quiescence window: how long after the last edit before a sync goes out (ms).
pub const QUIESCENCE_WINDOW_MS: u64 = 2000;

/// Debounced sync session bound to one backend document.
pub struct SyncSession<C, E = UnifiedDiff> {
    store: C,
    engine: E,
    tracker: ChangeTracker,
    debounce: Debounce,
    window: Duration,
}

impl<C: DocumentStore> SyncSession<C> {
    /// New session with the default unified-diff engine and window.
    pub fn new(store: C) -> Self {
        Self::with_engine(store, UnifiedDiff)
    }
}

impl<C: DocumentStore, E: DiffEngine> SyncSession<C, E> {
    /// New session with an explicit diff engine.
    pub fn with_engine(store: C, engine: E) -> Self {
        Self {
            store,
            engine,
            tracker: ChangeTracker::new(),
            debounce: Debounce::new(),
            window: Duration::from_millis(QUIESCENCE_WINDOW_MS),
        }
    }

    /// Override the quiescence window.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// The tracked base snapshot and document id.
    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    /// True while a sync is armed and waiting out its window.
    pub fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Deadline of the armed sync, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// Create a document from `content` on the backend.
    ///
    /// On success the tracker records the backend-assigned id and the exact
    /// content that was sent.
    pub async fn create(&mut self, content: &str) -> Result<DocumentId, SyncError> {
        let id = self.store.create(content).await?;
        self.tracker.record_created(id.clone(), content.to_owned());
        tracing::debug!(%id, "created document");
        Ok(id)
    }

    /// Load an existing document by id.
    ///
    /// On success the tracker records the id and the fetched content; the
    /// returned string is what the shell feeds back into the editor.
    pub async fn load(&mut self, id: DocumentId) -> Result<String, SyncError> {
        let content = self.store.fetch(&id).await?;
        self.tracker.record_loaded(id.clone(), content.clone());
        tracing::debug!(%id, "loaded document");
        Ok(content)
    }

    /// Observe an edit: diff the new snapshot against the tracked base and
    /// (re-)arm the debounce machine.
    ///
    /// The patch is computed eagerly, here, against whatever the tracker
    /// currently holds; the entry armed previously in the same window is
    /// discarded, not merged. Fails without arming if no create or load has
    /// established a base yet.
    pub fn note_edit(&mut self, snapshot: impl Into<String>) -> Result<(), SyncError> {
        let snapshot = snapshot.into();
        let base = self
            .tracker
            .previous_snapshot()
            .ok_or(SyncError::UninitializedBase)?;
        let document_id = self
            .tracker
            .document_id()
            .cloned()
            .ok_or(SyncError::MissingDocument)?;

        let patch = self.engine.diff(base, &snapshot)?;
        let deadline = Instant::now() + self.window;
        self.debounce.arm(PendingSync {
            document_id,
            patch,
            snapshot,
            deadline,
        });
        tracing::debug!(window = ?self.window, "armed sync");
        Ok(())
    }

    /// Send the pending sync if its window has elapsed.
    ///
    /// On success the tracked base moves to the synced snapshot; on failure
    /// it is left unchanged and the error is logged only.
    pub async fn fire_due(&mut self) {
        let Some(pending) = self.debounce.fire_due(Instant::now()) else {
            return;
        };
        match self
            .store
            .apply_patch(&pending.document_id, &pending.patch)
            .await
        {
            Ok(()) => {
                tracing::debug!(id = %pending.document_id, "sync acknowledged");
                self.tracker.mark_synced(pending.snapshot);
            }
            Err(e) => {
                tracing::warn!(id = %pending.document_id, error = %e, "sync failed, keeping previous snapshot");
            }
        }
    }

    /// Drive the session from a channel of edit snapshots.
    ///
    /// Runs until the channel closes, then lets any still-pending sync wait
    /// out its full window and sends it before returning. Edit failures
    /// (uninitialized base, diff errors) are logged and dropped, matching
    /// the fire-and-forget contract of the notification path.
    pub async fn run(&mut self, mut events: mpsc::Receiver<String>) {
        loop {
            let deadline = self.debounce.deadline();
            let window_elapsed = async {
                match deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                event = events.recv() => match event {
                    Some(snapshot) => {
                        if let Err(e) = self.note_edit(snapshot) {
                            tracing::warn!(error = %e, "dropping edit");
                        }
                    }
                    None => break,
                },
                () = window_elapsed => self.fire_due().await,
            }
        }

        // Channel closed; drain the armed sync, if any, after its window.
        if let Some(deadline) = self.debounce.deadline() {
            tokio::time::sleep_until(deadline).await;
            self.fire_due().await;
        }
    }
}
