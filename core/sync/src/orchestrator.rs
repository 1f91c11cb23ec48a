//! Top-level sync orchestration across the entity registry.

use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::classify::{classify, ErrorReporter, SyncFault};
use crate::config::SyncGroup;
use crate::events::{SyncErrorEvent, SyncGroupResult, SyncPhase, SyncProgress, SyncRunState};
use crate::model::ModelSync;

/// Buffered events per broadcast stream. Slow subscribers lag and skip,
/// they never block the engine.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Orchestrator fanning sync out across the entity registry.
///
/// The registry is built once at process start and passed in; it cannot be
/// mutated at runtime. Every per-entity failure is caught here, classified
/// and swallowed: a group-level sync always completes from the caller's
/// perspective, and true failure is only observable on the event streams.
pub struct DataSync {
    registry: Vec<Arc<dyn ModelSync>>,
    reporter: Arc<dyn ErrorReporter>,
    results_tx: broadcast::Sender<SyncGroupResult>,
    progress_tx: broadcast::Sender<SyncProgress>,
    errors_tx: broadcast::Sender<SyncErrorEvent>,
}

impl DataSync {
    /// Create the orchestrator over an immutable registry.
    pub fn new(registry: Vec<Arc<dyn ModelSync>>, reporter: Arc<dyn ErrorReporter>) -> Self {
        let (results_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (progress_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (errors_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            registry,
            reporter,
            results_tx,
            progress_tx,
            errors_tx,
        }
    }

    /// Sync every registered entity whose config puts it in `group`.
    ///
    /// Members run concurrently with delay-error semantics: every member
    /// runs to completion and every error is observed; no failure aborts a
    /// sibling.
    pub async fn sync(&self, group: SyncGroup) {
        let _ = self.results_tx.send(SyncGroupResult {
            group,
            state: SyncRunState::Syncing,
        });

        let mut members = Vec::new();
        for model in &self.registry {
            if model.sync_config().await.sync_group == group {
                members.push(model.clone());
            }
        }
        info!(?group, members = members.len(), "Sync group started");

        let outcomes = join_all(members.iter().map(|model| self.run_member(model.as_ref()))).await;

        let state = if outcomes.iter().all(|completed| *completed) {
            SyncRunState::Success
        } else {
            SyncRunState::Failure
        };
        let _ = self.results_tx.send(SyncGroupResult { group, state });
        info!(?group, ?state, "Sync group finished");
    }

    /// Sync every defined group, concurrently.
    pub async fn sync_the_world(&self) {
        join_all(SyncGroup::ALL.iter().map(|group| self.sync(*group))).await;
    }

    /// Schedule `sync(group)` on the background executor without awaiting
    /// it. For opportunistic triggers, e.g. right after a user is approved
    /// to sync.
    pub fn fire_and_forget_sync(self: &Arc<Self>, group: SyncGroup) -> JoinHandle<()> {
        let data_sync = self.clone();
        tokio::spawn(async move { data_sync.sync(group).await })
    }

    /// Subscribe to group-level sync results. No replay of past events.
    pub fn stream_sync_results(&self) -> broadcast::Receiver<SyncGroupResult> {
        self.results_tx.subscribe()
    }

    /// Subscribe to per-entity progress markers.
    pub fn stream_sync_progress(&self) -> broadcast::Receiver<SyncProgress> {
        self.progress_tx.subscribe()
    }

    /// Subscribe to classified per-entity sync failures.
    pub fn stream_sync_errors(&self) -> broadcast::Receiver<SyncErrorEvent> {
        self.errors_tx.subscribe()
    }

    /// Run one member, emitting progress markers and classifying any error.
    /// Returns whether the member completed cleanly.
    async fn run_member(&self, model: &dyn ModelSync) -> bool {
        let entity = model.name();
        let _ = self.progress_tx.send(SyncProgress {
            entity,
            phase: SyncPhase::Started,
        });

        match model.sync().await {
            Ok(()) => {
                let _ = self.progress_tx.send(SyncProgress {
                    entity,
                    phase: SyncPhase::Completed,
                });
                true
            }
            Err(err) => {
                let fault = classify(&err);
                let event = SyncErrorEvent {
                    entity,
                    fault,
                    message: err.to_string(),
                };
                match fault {
                    SyncFault::NetworkRelated | SyncFault::Unauthenticated => {
                        // Normal operating conditions for an offline-first
                        // client; logged, not reported.
                        warn!(entity, ?fault, error = %err, "Sync attempt failed");
                    }
                    SyncFault::ServerError | SyncFault::Unexpected => {
                        error!(entity, ?fault, error = %err, "Sync attempt failed");
                        self.reporter.report(&event);
                    }
                }
                let _ = self.errors_tx.send(event);
                let _ = self.progress_tx.send(SyncProgress {
                    entity,
                    phase: SyncPhase::Failed,
                });
                false
            }
        }
    }
}
