//! Common types used throughout CareLedger.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reconciliation state of a single local record against the server.
///
/// Every syncable record carries exactly one status at any time. Transitions:
/// a local write always sets `Pending`; a confirmed push or an accepted
/// pull-merge sets `Done`; `Invalid` is set only by explicit business rules
/// and must go back through `Pending` via a local correction before the
/// record can sync again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Created or modified locally, not yet confirmed persisted by the server.
    Pending,
    /// Confirmed synced; safe to be overwritten by server data.
    Done,
    /// Flagged as non-conforming; must be corrected before it can sync again.
    Invalid,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Pending => write!(f, "pending"),
            SyncStatus::Done => write!(f, "done"),
            SyncStatus::Invalid => write!(f, "invalid"),
        }
    }
}

/// Opaque server-issued cursor marking pull pagination progress for one
/// entity type.
///
/// The engine never inspects the contents; it only stores the cursor after a
/// successfully merged page and sends it back on the next pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PullToken(String);

impl PullToken {
    /// Wrap a server-issued cursor string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the inner cursor string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PullToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
