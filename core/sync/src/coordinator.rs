//! Generic, entity-agnostic push/pull engine.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use careledger_common::{Result, SyncStatus};
use careledger_storage::{PullTokenStore, SyncableRecord, SynceableRepository};

use crate::api::{EntityApi, PullResponse};

/// Outcome of one push run. Observability only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushReport {
    /// Records uploaded in this run.
    pub pushed: usize,
}

/// Outcome of one pull run. Observability only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullReport {
    /// Payloads merged in this run.
    pub pulled: usize,
    /// Pages requested, including the final empty one.
    pub pages: usize,
}

/// The push and pull protocols, generic over any [`SynceableRepository`]
/// and [`EntityApi`] pair.
///
/// The coordinator holds no state of its own: everything it needs lives in
/// the repository, the token store and the API client, so one engine serves
/// every entity type.
pub struct SyncCoordinator;

impl SyncCoordinator {
    /// Upload every `Pending` record, then mark the uploaded batch `Done`.
    ///
    /// A failed upload performs no local mutation: the batch stays `Pending`
    /// and is retried wholesale on the next externally triggered cycle.
    /// The ack is guarded by the snapshotted `updated_at`, so a record the
    /// user edits while the upload is in flight stays `Pending`.
    pub async fn push<R, A>(repository: &R, api: &A) -> Result<PushReport>
    where
        R: SynceableRepository,
        A: EntityApi<Payload = <R::Record as SyncableRecord>::Payload>,
    {
        let pending = repository
            .records_with_sync_status(SyncStatus::Pending)
            .await?;
        if pending.is_empty() {
            return Ok(PushReport::default());
        }

        let snapshot: Vec<(Uuid, DateTime<Utc>)> = pending
            .iter()
            .map(|record| (record.uuid(), record.updated_at()))
            .collect();
        let payloads: Vec<_> = pending.iter().map(|record| record.to_payload()).collect();

        api.push(payloads).await?;
        repository.mark_synced_up_to(&snapshot).await?;

        debug!(
            entity = <R::Record as SyncableRecord>::ENTITY,
            pushed = snapshot.len(),
            "Push completed"
        );
        Ok(PushReport {
            pushed: snapshot.len(),
        })
    }

    /// Fetch and merge server pages, advancing the persisted pull token
    /// after every merged page, until the server returns an empty page.
    ///
    /// Because the token is committed per page, a crash mid-pull resumes
    /// from the last merged page, and replaying a page is harmless: merge
    /// is idempotent and `Pending` local edits are never overwritten.
    pub async fn pull<R, A>(
        repository: &R,
        tokens: &dyn PullTokenStore,
        batch_size: usize,
        api: &A,
    ) -> Result<PullReport>
    where
        R: SynceableRepository,
        A: EntityApi<Payload = <R::Record as SyncableRecord>::Payload>,
    {
        let entity = <R::Record as SyncableRecord>::ENTITY;
        let mut token = tokens.get(entity).await?;
        let mut report = PullReport::default();

        loop {
            let PullResponse {
                payloads,
                process_token,
            } = api.pull(batch_size, token.as_ref()).await?;

            let page = payloads.len();
            repository.merge_with_local_data(payloads).await?;
            tokens.set(entity, &process_token).await?;
            token = Some(process_token);

            report.pages += 1;
            report.pulled += page;
            if page == 0 {
                break;
            }
        }

        debug!(
            entity,
            pulled = report.pulled,
            pages = report.pages,
            "Pull completed"
        );
        Ok(report)
    }
}
