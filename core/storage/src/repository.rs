//! Syncable repository trait definition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use careledger_common::{Result, SyncStatus};

/// A local record that participates in synchronization.
///
/// The sync engine never inspects entity-specific fields; everything it
/// needs from a record is exposed here: identity, timestamps and the sync
/// status tag.
pub trait SyncableRecord: Clone + Send + Sync + 'static {
    /// Wire representation of this record.
    type Payload: SyncPayload<Record = Self>;

    /// Entity name used for API paths, pull-token keys and log fields
    /// (e.g. "appointments").
    const ENTITY: &'static str;

    /// Stable identity of the record, shared with the server.
    fn uuid(&self) -> Uuid;

    /// Current reconciliation state.
    fn sync_status(&self) -> SyncStatus;

    /// Replace the reconciliation state.
    fn set_sync_status(&mut self, status: SyncStatus);

    /// Last local modification time. A fresh local edit must bump this.
    fn updated_at(&self) -> DateTime<Utc>;

    /// Convert to the server-shaped payload, dropping sync bookkeeping.
    fn to_payload(&self) -> Self::Payload;
}

/// Server-shaped wire representation of a record, free of local-only sync
/// bookkeeping fields.
pub trait SyncPayload: Clone + Send + Sync + 'static {
    /// The local record type this payload converts to.
    type Record: SyncableRecord;

    /// Identity of the record this payload describes.
    fn uuid(&self) -> Uuid;

    /// Convert to a local record carrying the given sync status.
    fn into_record(self, status: SyncStatus) -> Self::Record;
}

/// Storage contract each syncable entity's repository implements.
///
/// Implementations must provide atomic, per-record status transitions:
/// `save` and the status operations may never interleave into a torn state.
/// Records are soft-deleted by their `deleted_at` timestamp and are never
/// physically removed through this contract.
#[async_trait]
pub trait SynceableRepository: Send + Sync {
    /// The record type stored by this repository.
    type Record: SyncableRecord;

    /// Idempotent upsert by uuid.
    ///
    /// # Preconditions
    /// - Callers must set the correct `SyncStatus` on each record before
    ///   saving; records are persisted as-is.
    async fn save(&self, records: Vec<Self::Record>) -> Result<()>;

    /// Point-in-time snapshot of all records currently in `status`.
    async fn records_with_sync_status(&self, status: SyncStatus) -> Result<Vec<Self::Record>>;

    /// Bulk transition: every record in `from` moves to `to`.
    async fn set_sync_status(&self, from: SyncStatus, to: SyncStatus) -> Result<()>;

    /// Targeted transition for the given record ids.
    ///
    /// # Panics
    /// Panics if `ids` is empty. An empty id list signals a caller bug, not
    /// a runtime condition, and must fail loudly during development.
    async fn set_sync_status_for_ids(&self, ids: &[Uuid], to: SyncStatus) -> Result<()>;

    /// Ack-time transition `Pending -> Done` for a pushed batch.
    ///
    /// Applies only to records whose `updated_at` still equals the value
    /// captured in `snapshot` and whose status is still `Pending`. A local
    /// edit that landed between the snapshot and the ack bumps `updated_at`,
    /// so the edited record stays `Pending` and is pushed again on the next
    /// cycle.
    async fn mark_synced_up_to(&self, snapshot: &[(Uuid, DateTime<Utc>)]) -> Result<()>;

    /// Merge a page of server payloads into local storage.
    ///
    /// For each payload: if no local record exists, or the local record's
    /// status is not `Pending`, the payload is stored as a record with
    /// status `Done`. If a local record exists and is `Pending`, the payload
    /// is skipped entirely: the user's unsynced local edit is protected and
    /// left untouched until it has itself been pushed.
    async fn merge_with_local_data(
        &self,
        payloads: Vec<<Self::Record as SyncableRecord>::Payload>,
    ) -> Result<()>;

    /// Total number of stored records. Observability only.
    async fn record_count(&self) -> Result<usize>;

    /// Number of records awaiting sync. Observability only.
    async fn pending_sync_record_count(&self) -> Result<usize>;
}
