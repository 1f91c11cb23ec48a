//! In-memory repository for testing and development.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use careledger_common::{Result, SyncStatus};

use crate::repository::{SyncPayload, SyncableRecord, SynceableRepository};

/// In-memory syncable repository.
///
/// Reference implementation of [`SynceableRepository`]: all operations run
/// under a single lock, so status transitions and saves are atomic per call.
/// Data is lost on drop; a durable store plugs in behind the same trait.
pub struct MemoryRepository<R: SyncableRecord> {
    records: Arc<RwLock<HashMap<Uuid, R>>>,
}

impl<R: SyncableRecord> MemoryRepository<R> {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Look up a record by uuid.
    pub fn get(&self, uuid: &Uuid) -> Option<R> {
        self.records.read().unwrap().get(uuid).cloned()
    }

    /// Snapshot of every stored record.
    pub fn all(&self) -> Vec<R> {
        self.records.read().unwrap().values().cloned().collect()
    }

    /// Mutate every record matching `predicate` in one atomic pass.
    ///
    /// Returns the number of records touched. This is the hook entity write
    /// paths use for domain transitions (superseding appointments,
    /// correction passes) without widening the sync contract.
    pub fn update_matching<P, M>(&self, predicate: P, mut mutate: M) -> usize
    where
        P: Fn(&R) -> bool,
        M: FnMut(&mut R),
    {
        let mut records = self.records.write().unwrap();
        let mut touched = 0;
        for record in records.values_mut() {
            if predicate(record) {
                mutate(record);
                touched += 1;
            }
        }
        touched
    }

    fn can_be_overridden(local: Option<&R>) -> bool {
        // Local pending work always wins over a concurrent server copy.
        local.map_or(true, |record| record.sync_status() != SyncStatus::Pending)
    }
}

impl<R: SyncableRecord> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: SyncableRecord> Clone for MemoryRepository<R> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
        }
    }
}

#[async_trait]
impl<R: SyncableRecord> SynceableRepository for MemoryRepository<R> {
    type Record = R;

    async fn save(&self, records: Vec<R>) -> Result<()> {
        let mut map = self.records.write().unwrap();
        for record in records {
            map.insert(record.uuid(), record);
        }
        Ok(())
    }

    async fn records_with_sync_status(&self, status: SyncStatus) -> Result<Vec<R>> {
        let map = self.records.read().unwrap();
        Ok(map
            .values()
            .filter(|record| record.sync_status() == status)
            .cloned()
            .collect())
    }

    async fn set_sync_status(&self, from: SyncStatus, to: SyncStatus) -> Result<()> {
        let mut map = self.records.write().unwrap();
        for record in map.values_mut() {
            if record.sync_status() == from {
                record.set_sync_status(to);
            }
        }
        Ok(())
    }

    async fn set_sync_status_for_ids(&self, ids: &[Uuid], to: SyncStatus) -> Result<()> {
        assert!(
            !ids.is_empty(),
            "set_sync_status_for_ids called with an empty id list"
        );
        let mut map = self.records.write().unwrap();
        for id in ids {
            if let Some(record) = map.get_mut(id) {
                record.set_sync_status(to);
            }
        }
        Ok(())
    }

    async fn mark_synced_up_to(&self, snapshot: &[(Uuid, DateTime<Utc>)]) -> Result<()> {
        let mut map = self.records.write().unwrap();
        for (id, seen_updated_at) in snapshot {
            if let Some(record) = map.get_mut(id) {
                // A local edit after the snapshot bumps updated_at and resets
                // the record to Pending; the ack must not overwrite that.
                if record.sync_status() == SyncStatus::Pending
                    && record.updated_at() == *seen_updated_at
                {
                    record.set_sync_status(SyncStatus::Done);
                }
            }
        }
        Ok(())
    }

    async fn merge_with_local_data(&self, payloads: Vec<R::Payload>) -> Result<()> {
        let mut map = self.records.write().unwrap();
        for payload in payloads {
            let uuid = payload.uuid();
            if Self::can_be_overridden(map.get(&uuid)) {
                map.insert(uuid, payload.into_record(SyncStatus::Done));
            }
        }
        Ok(())
    }

    async fn record_count(&self) -> Result<usize> {
        Ok(self.records.read().unwrap().len())
    }

    async fn pending_sync_record_count(&self) -> Result<usize> {
        let map = self.records.read().unwrap();
        Ok(map
            .values()
            .filter(|record| record.sync_status() == SyncStatus::Pending)
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        uuid: Uuid,
        body: String,
        sync_status: SyncStatus,
        updated_at: DateTime<Utc>,
    }

    impl Note {
        fn new(body: &str, status: SyncStatus) -> Self {
            Self {
                uuid: Uuid::new_v4(),
                body: body.to_string(),
                sync_status: status,
                updated_at: Utc::now(),
            }
        }
    }

    #[derive(Debug, Clone)]
    struct NotePayload {
        uuid: Uuid,
        body: String,
        updated_at: DateTime<Utc>,
    }

    impl SyncableRecord for Note {
        type Payload = NotePayload;
        const ENTITY: &'static str = "notes";

        fn uuid(&self) -> Uuid {
            self.uuid
        }
        fn sync_status(&self) -> SyncStatus {
            self.sync_status
        }
        fn set_sync_status(&mut self, status: SyncStatus) {
            self.sync_status = status;
        }
        fn updated_at(&self) -> DateTime<Utc> {
            self.updated_at
        }
        fn to_payload(&self) -> NotePayload {
            NotePayload {
                uuid: self.uuid,
                body: self.body.clone(),
                updated_at: self.updated_at,
            }
        }
    }

    impl SyncPayload for NotePayload {
        type Record = Note;

        fn uuid(&self) -> Uuid {
            self.uuid
        }
        fn into_record(self, status: SyncStatus) -> Note {
            Note {
                uuid: self.uuid,
                body: self.body,
                sync_status: status,
                updated_at: self.updated_at,
            }
        }
    }

    #[tokio::test]
    async fn test_save_is_idempotent_upsert() {
        let repo = MemoryRepository::<Note>::new();
        let mut note = Note::new("first", SyncStatus::Pending);

        repo.save(vec![note.clone()]).await.unwrap();
        note.body = "second".to_string();
        repo.save(vec![note.clone()]).await.unwrap();

        assert_eq!(repo.record_count().await.unwrap(), 1);
        assert_eq!(repo.get(&note.uuid).unwrap().body, "second");
    }

    #[tokio::test]
    async fn test_records_with_sync_status_filters() {
        let repo = MemoryRepository::<Note>::new();
        repo.save(vec![
            Note::new("a", SyncStatus::Pending),
            Note::new("b", SyncStatus::Done),
            Note::new("c", SyncStatus::Pending),
        ])
        .await
        .unwrap();

        let pending = repo
            .records_with_sync_status(SyncStatus::Pending)
            .await
            .unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(repo.pending_sync_record_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_bulk_status_transition() {
        let repo = MemoryRepository::<Note>::new();
        repo.save(vec![
            Note::new("a", SyncStatus::Invalid),
            Note::new("b", SyncStatus::Done),
        ])
        .await
        .unwrap();

        repo.set_sync_status(SyncStatus::Invalid, SyncStatus::Pending)
            .await
            .unwrap();

        assert_eq!(repo.pending_sync_record_count().await.unwrap(), 1);
        let done = repo
            .records_with_sync_status(SyncStatus::Done)
            .await
            .unwrap();
        assert_eq!(done.len(), 1);
    }

    #[tokio::test]
    #[should_panic(expected = "empty id list")]
    async fn test_empty_id_list_is_a_precondition_failure() {
        let repo = MemoryRepository::<Note>::new();
        let _ = repo.set_sync_status_for_ids(&[], SyncStatus::Done).await;
    }

    #[tokio::test]
    async fn test_merge_protects_pending_local_edits() {
        let repo = MemoryRepository::<Note>::new();
        let local = Note::new("local edit", SyncStatus::Pending);
        repo.save(vec![local.clone()]).await.unwrap();

        let server_copy = NotePayload {
            uuid: local.uuid,
            body: "server copy".to_string(),
            updated_at: Utc::now(),
        };
        repo.merge_with_local_data(vec![server_copy]).await.unwrap();

        let after = repo.get(&local.uuid).unwrap();
        assert_eq!(after, local);
    }

    #[tokio::test]
    async fn test_merge_overrides_done_invalid_and_absent() {
        let repo = MemoryRepository::<Note>::new();
        let done = Note::new("done", SyncStatus::Done);
        let invalid = Note::new("invalid", SyncStatus::Invalid);
        repo.save(vec![done.clone(), invalid.clone()]).await.unwrap();

        let absent_uuid = Uuid::new_v4();
        let payloads = vec![
            NotePayload {
                uuid: done.uuid,
                body: "done updated".to_string(),
                updated_at: Utc::now(),
            },
            NotePayload {
                uuid: invalid.uuid,
                body: "invalid updated".to_string(),
                updated_at: Utc::now(),
            },
            NotePayload {
                uuid: absent_uuid,
                body: "brand new".to_string(),
                updated_at: Utc::now(),
            },
        ];
        repo.merge_with_local_data(payloads).await.unwrap();

        for (uuid, body) in [
            (done.uuid, "done updated"),
            (invalid.uuid, "invalid updated"),
            (absent_uuid, "brand new"),
        ] {
            let record = repo.get(&uuid).unwrap();
            assert_eq!(record.body, body);
            assert_eq!(record.sync_status, SyncStatus::Done);
        }
    }

    #[tokio::test]
    async fn test_ack_skips_records_edited_after_snapshot() {
        let repo = MemoryRepository::<Note>::new();
        let untouched = Note::new("untouched", SyncStatus::Pending);
        let edited = Note::new("edited", SyncStatus::Pending);
        repo.save(vec![untouched.clone(), edited.clone()]).await.unwrap();

        let snapshot = vec![
            (untouched.uuid, untouched.updated_at),
            (edited.uuid, edited.updated_at),
        ];

        // A local edit lands between the snapshot and the ack.
        repo.update_matching(
            |r| r.uuid == edited.uuid,
            |r| {
                r.body = "edited again".to_string();
                r.updated_at = Utc::now();
            },
        );

        repo.mark_synced_up_to(&snapshot).await.unwrap();

        assert_eq!(
            repo.get(&untouched.uuid).unwrap().sync_status,
            SyncStatus::Done
        );
        assert_eq!(
            repo.get(&edited.uuid).unwrap().sync_status,
            SyncStatus::Pending
        );
    }
}
