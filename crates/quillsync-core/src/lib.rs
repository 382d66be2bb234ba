//! Debounced document synchronization for editor front-ends.
//!
//! This crate provides:
//! - `ChangeTracker`: the last-acknowledged snapshot and document identifier
//! - `DiffEngine` + `UnifiedDiff`: pluggable text diffing with a round-trip
//!   guarantee (applying `diff(a, b)` to `a` reproduces `b`)
//! - `Debounce`: explicit Idle/Pending state machine for coalescing edits
//! - `SyncSession`: ties edit notifications to a `DocumentStore` backend
//!
//! The editor shell feeds serialized snapshots into a session; the session
//! diffs them against the last snapshot the backend acknowledged and pushes
//! one patch per quiescence window.

mod debounce;
mod error;
mod patch;
mod session;
mod store;
mod tracker;

pub use debounce::{Debounce, DebounceState, PendingSync};
pub use error::{PatchError, SyncError};
pub use patch::{DiffEngine, Patch, UnifiedDiff};
pub use session::{QUIESCENCE_WINDOW_MS, SyncSession};
pub use store::DocumentStore;
pub use tracker::{ChangeTracker, DocumentId};
