//! Sync observability events.
//!
//! These are broadcast to UI subscribers (sync indicators, badges); nothing
//! in the engine's control flow depends on them.

use crate::classify::SyncFault;
use crate::config::SyncGroup;

/// Lifecycle of one group-level sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncRunState {
    /// The group run has started.
    Syncing,
    /// Every member completed without error.
    Success,
    /// At least one member failed.
    Failure,
}

/// Group-level result event, emitted at the start and end of each run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncGroupResult {
    pub group: SyncGroup,
    pub state: SyncRunState,
}

/// Per-entity progress marker inside a group run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Started,
    Completed,
    Failed,
}

/// Progress event for one entity's sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncProgress {
    pub entity: &'static str,
    pub phase: SyncPhase,
}

/// A classified per-entity sync failure.
#[derive(Debug, Clone)]
pub struct SyncErrorEvent {
    pub entity: &'static str,
    pub fault: SyncFault,
    pub message: String,
}
