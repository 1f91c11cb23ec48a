//! Per-entity sync adapter.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use careledger_common::Result;
use careledger_storage::{PullTokenStore, SyncableRecord, SynceableRepository};

use crate::api::EntityApi;
use crate::config::{SyncConfig, SyncConfigSource};
use crate::coordinator::SyncCoordinator;

/// Identity/session gate: whether the current user may sync at all.
///
/// Authentication itself is an external collaborator; the engine only asks
/// this one boolean question before touching the network.
#[async_trait]
pub trait SyncGate: Send + Sync {
    async fn can_sync_data(&self) -> bool;
}

/// Gate that always authorizes. For tests and single-user tools.
pub struct AlwaysAuthorized;

#[async_trait]
impl SyncGate for AlwaysAuthorized {
    async fn can_sync_data(&self) -> bool {
        true
    }
}

/// One entity type's sync surface, as registered with the orchestrator.
#[async_trait]
pub trait ModelSync: Send + Sync {
    /// Entity name, for logs and progress events.
    fn name(&self) -> &'static str;

    /// Resolve this entity's sync configuration. May be asynchronous when
    /// backed by remote config.
    async fn sync_config(&self) -> SyncConfig;

    /// Run push and pull concurrently. A no-op success when the gate denies.
    async fn sync(&self) -> Result<()>;

    /// Upload locally changed records.
    async fn push(&self) -> Result<()>;

    /// Fetch and merge server-side changes.
    async fn pull(&self) -> Result<()>;
}

/// Generic [`ModelSync`] implementation composing one entity's repository,
/// API client, pull-token store, config source and the authorization gate.
pub struct EntitySync<R, A> {
    repository: Arc<R>,
    api: Arc<A>,
    tokens: Arc<dyn PullTokenStore>,
    config: Arc<dyn SyncConfigSource>,
    gate: Arc<dyn SyncGate>,
}

impl<R, A> EntitySync<R, A>
where
    R: SynceableRepository + 'static,
    A: EntityApi<Payload = <R::Record as SyncableRecord>::Payload> + 'static,
{
    /// Wire up one entity's sync adapter.
    pub fn new(
        repository: Arc<R>,
        api: Arc<A>,
        tokens: Arc<dyn PullTokenStore>,
        config: Arc<dyn SyncConfigSource>,
        gate: Arc<dyn SyncGate>,
    ) -> Self {
        Self {
            repository,
            api,
            tokens,
            config,
            gate,
        }
    }
}

#[async_trait]
impl<R, A> ModelSync for EntitySync<R, A>
where
    R: SynceableRepository + 'static,
    A: EntityApi<Payload = <R::Record as SyncableRecord>::Payload> + 'static,
{
    fn name(&self) -> &'static str {
        <R::Record as SyncableRecord>::ENTITY
    }

    async fn sync_config(&self) -> SyncConfig {
        self.config.sync_config(self.name()).await
    }

    async fn sync(&self) -> Result<()> {
        if !self.gate.can_sync_data().await {
            debug!(entity = self.name(), "Sync skipped: not authorized");
            return Ok(());
        }

        // Delay-error semantics: both directions run to completion and both
        // outcomes are observed before this call resolves.
        let (push, pull) = tokio::join!(self.push(), self.pull());
        match (push, pull) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(error), Ok(())) | (Ok(()), Err(error)) => Err(error),
            (Err(push_error), Err(pull_error)) => {
                warn!(
                    entity = self.name(),
                    error = %pull_error,
                    "Pull failed alongside push"
                );
                Err(push_error)
            }
        }
    }

    async fn push(&self) -> Result<()> {
        SyncCoordinator::push(self.repository.as_ref(), self.api.as_ref()).await?;
        Ok(())
    }

    async fn pull(&self) -> Result<()> {
        let config = self.sync_config().await;
        SyncCoordinator::pull(
            self.repository.as_ref(),
            self.tokens.as_ref(),
            config.batch_size,
            self.api.as_ref(),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    use careledger_common::{Error, PullToken, Result, SyncStatus};
    use careledger_records::{BloodPressure, BloodPressurePayload};
    use careledger_storage::{MemoryRepository, MemoryTokenStore, SynceableRepository};

    use crate::api::PullResponse;
    use crate::config::StaticConfigSource;

    struct DeniedGate;

    #[async_trait]
    impl SyncGate for DeniedGate {
        async fn can_sync_data(&self) -> bool {
            false
        }
    }

    /// API whose push and pull can fail independently.
    #[derive(Default)]
    struct FlakyApi {
        fail_push: AtomicBool,
        fail_pull: AtomicBool,
        push_calls: AtomicU32,
        pull_calls: AtomicU32,
    }

    #[async_trait]
    impl EntityApi for FlakyApi {
        type Payload = BloodPressurePayload;

        async fn push(&self, _payloads: Vec<BloodPressurePayload>) -> Result<()> {
            self.push_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_push.load(Ordering::SeqCst) {
                return Err(Error::Network("push unreachable".to_string()));
            }
            Ok(())
        }

        async fn pull(
            &self,
            _batch_size: usize,
            token: Option<&PullToken>,
        ) -> Result<PullResponse<BloodPressurePayload>> {
            self.pull_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_pull.load(Ordering::SeqCst) {
                return Err(Error::Server("boom".to_string()));
            }
            Ok(PullResponse {
                payloads: Vec::new(),
                process_token: token.cloned().unwrap_or_else(|| PullToken::new("0")),
            })
        }
    }

    fn entity_sync(
        api: Arc<FlakyApi>,
        gate: Arc<dyn SyncGate>,
    ) -> (
        EntitySync<MemoryRepository<BloodPressure>, FlakyApi>,
        Arc<MemoryRepository<BloodPressure>>,
    ) {
        let repository = Arc::new(MemoryRepository::<BloodPressure>::new());
        let sync = EntitySync::new(
            repository.clone(),
            api,
            Arc::new(MemoryTokenStore::new()),
            Arc::new(StaticConfigSource::new(SyncConfig::frequent())),
            gate,
        );
        (sync, repository)
    }

    #[tokio::test]
    async fn test_denied_gate_is_a_noop_success() {
        let api = Arc::new(FlakyApi::default());
        let (sync, repository) = entity_sync(api.clone(), Arc::new(DeniedGate));

        repository
            .save(vec![BloodPressure::record(uuid::Uuid::new_v4(), 150, 95)])
            .await
            .unwrap();

        sync.sync().await.unwrap();

        assert_eq!(api.push_calls.load(Ordering::SeqCst), 0);
        assert_eq!(api.pull_calls.load(Ordering::SeqCst), 0);
        assert_eq!(repository.pending_sync_record_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_push_failure_does_not_prevent_pull() {
        let api = Arc::new(FlakyApi::default());
        api.fail_push.store(true, Ordering::SeqCst);
        let (sync, repository) = entity_sync(api.clone(), Arc::new(AlwaysAuthorized));

        repository
            .save(vec![BloodPressure::record(uuid::Uuid::new_v4(), 150, 95)])
            .await
            .unwrap();

        let result = sync.sync().await;

        assert!(matches!(result, Err(Error::Network(_))));
        // Pull still ran to completion.
        assert!(api.pull_calls.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_both_directions_failing_reports_push_error() {
        let api = Arc::new(FlakyApi::default());
        api.fail_push.store(true, Ordering::SeqCst);
        api.fail_pull.store(true, Ordering::SeqCst);
        let (sync, repository) = entity_sync(api.clone(), Arc::new(AlwaysAuthorized));

        repository
            .save(vec![BloodPressure::record(uuid::Uuid::new_v4(), 150, 95)])
            .await
            .unwrap();

        let result = sync.sync().await;
        assert!(matches!(result, Err(Error::Network(_))));
    }

    #[tokio::test]
    async fn test_successful_sync_drains_pending() {
        let api = Arc::new(FlakyApi::default());
        let (sync, repository) = entity_sync(api.clone(), Arc::new(AlwaysAuthorized));

        let reading = BloodPressure::record(uuid::Uuid::new_v4(), 150, 95);
        repository.save(vec![reading.clone()]).await.unwrap();

        sync.sync().await.unwrap();

        assert_eq!(
            repository.get(&reading.uuid).unwrap().sync_status,
            SyncStatus::Done
        );
        assert_eq!(sync.name(), "blood_pressures");
    }
}
