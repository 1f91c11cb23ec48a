//! Per-entity wire contract.

use async_trait::async_trait;

use careledger_common::{PullToken, Result};
use careledger_storage::SyncPayload;

/// One page of pulled payloads plus the cursor to request the next page.
#[derive(Debug, Clone)]
pub struct PullResponse<P> {
    /// Server records changed since the requested token. An empty page is
    /// the pagination termination signal.
    pub payloads: Vec<P>,
    /// Opaque "processed since" cursor to persist and send on the next pull.
    pub process_token: PullToken,
}

/// HTTP API client for one entity type.
///
/// Push is at-least-once: the server must treat each payload's uuid as an
/// idempotent upsert key, because a batch whose ack is lost will be sent
/// again on the next sync cycle.
#[async_trait]
pub trait EntityApi: Send + Sync {
    /// Payload type carried on the wire.
    type Payload: SyncPayload;

    /// Upload a batch of locally changed records.
    async fn push(&self, payloads: Vec<Self::Payload>) -> Result<()>;

    /// Fetch one page of server-side changes after `token` (`None` on the
    /// first ever pull for this entity).
    async fn pull(
        &self,
        batch_size: usize,
        token: Option<&PullToken>,
    ) -> Result<PullResponse<Self::Payload>>;
}
