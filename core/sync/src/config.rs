//! Per-entity sync configuration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Cadence partition controlling which entity types sync together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncGroup {
    /// Clinical data edited at the point of care; synced often.
    Frequent,
    /// Slow-moving reference data; synced about once a day.
    Daily,
}

impl SyncGroup {
    /// Every defined group, in scheduling order.
    pub const ALL: [SyncGroup; 2] = [SyncGroup::Frequent, SyncGroup::Daily];
}

/// Sync tuning for one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Number of records requested or sent per network round-trip.
    pub batch_size: usize,
    /// How often the background trigger should run this entity's sync.
    pub sync_interval: Duration,
    /// Which group this entity syncs with.
    pub sync_group: SyncGroup,
}

impl SyncConfig {
    /// Defaults for frequently edited clinical data.
    pub fn frequent() -> Self {
        Self {
            batch_size: 500,
            sync_interval: Duration::from_secs(15 * 60),
            sync_group: SyncGroup::Frequent,
        }
    }

    /// Defaults for daily reference data.
    pub fn daily() -> Self {
        Self {
            batch_size: 1000,
            sync_interval: Duration::from_secs(24 * 60 * 60),
            sync_group: SyncGroup::Daily,
        }
    }
}

/// Source of per-entity sync configuration.
///
/// This is the seam for a remote-config reader: resolution may hit the
/// network, so it is async, and implementations are expected to fall back
/// to static defaults when the remote value is missing or malformed.
#[async_trait]
pub trait SyncConfigSource: Send + Sync {
    /// Resolve the config for an entity (by its `ENTITY` name).
    async fn sync_config(&self, entity: &str) -> SyncConfig;
}

/// Static configuration: a fallback default plus per-entity overrides.
pub struct StaticConfigSource {
    default: SyncConfig,
    overrides: HashMap<String, SyncConfig>,
}

impl StaticConfigSource {
    /// Create a source that answers `default` for every entity.
    pub fn new(default: SyncConfig) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    /// Override the config for one entity.
    pub fn with_override(mut self, entity: impl Into<String>, config: SyncConfig) -> Self {
        self.overrides.insert(entity.into(), config);
        self
    }
}

#[async_trait]
impl SyncConfigSource for StaticConfigSource {
    async fn sync_config(&self, entity: &str) -> SyncConfig {
        self.overrides
            .get(entity)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }
}
