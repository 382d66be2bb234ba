//! Debounce state machine for coalescing edit bursts.
//!
//! Two states: **Idle** (nothing to send) and **Pending** (a sync is armed
//! with a deadline). Arming while Pending replaces the previous entry, which
//! is how rapid-fire edits collapse to a single outbound call: every edit in
//! a burst is diffed against the same pre-batch base, so the last patch
//! already covers the whole burst and earlier ones can be discarded.
//!
//! The machine takes instants as arguments and never reads the clock itself,
//! so tests drive it with virtual time. The async driver lives in
//! [`SyncSession::run`](crate::SyncSession::run).

use tokio::time::Instant;

use crate::patch::Patch;
use crate::tracker::DocumentId;

/// A sync captured at arm time: the id and patch that will go out if no
/// further edit arrives before the deadline, plus the snapshot that becomes
/// the tracked base once the backend acknowledges.
#[derive(Debug, Clone)]
pub struct PendingSync {
    /// Document identifier captured when the edit was observed.
    pub document_id: DocumentId,
    /// Patch from the tracked base to `snapshot`.
    pub patch: Patch,
    /// The new side of the patch.
    pub snapshot: String,
    /// When the quiescence window elapses.
    pub deadline: Instant,
}

/// Debounce machine states.
#[derive(Debug, Clone, Default)]
pub enum DebounceState {
    /// No pending send.
    #[default]
    Idle,
    /// A sync is armed and waiting out the quiescence window.
    Pending(PendingSync),
}

/// Explicit Idle/Pending debounce with cancellation as a first-class move.
#[derive(Debug, Clone, Default)]
pub struct Debounce {
    state: DebounceState,
}

impl Debounce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a sync, cancelling any previously pending one.
    ///
    /// Returns the entry that was displaced, if any.
    pub fn arm(&mut self, pending: PendingSync) -> Option<PendingSync> {
        let displaced = self.cancel();
        self.state = DebounceState::Pending(pending);
        displaced
    }

    /// Drop any pending sync, returning to Idle.
    pub fn cancel(&mut self) -> Option<PendingSync> {
        match std::mem::take(&mut self.state) {
            DebounceState::Idle => None,
            DebounceState::Pending(pending) => Some(pending),
        }
    }

    /// Take the pending sync if its deadline has been reached.
    ///
    /// Leaves the machine Idle when it fires; a later edit must re-arm.
    pub fn fire_due(&mut self, now: Instant) -> Option<PendingSync> {
        match &self.state {
            DebounceState::Pending(pending) if now >= pending.deadline => self.cancel(),
            _ => None,
        }
    }

    /// Deadline of the pending sync, if one is armed.
    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            DebounceState::Idle => None,
            DebounceState::Pending(pending) => Some(pending.deadline),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DebounceState::Pending(_))
    }
}
