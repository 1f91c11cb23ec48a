//! Pull-token persistence.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use tokio::sync::Mutex;
use tracing::debug;

use careledger_common::{Error, PullToken, Result};

/// Durable store for the per-entity pull cursor.
///
/// One token (or none, before the first successful pull) per entity type.
/// The token is committed after every successfully merged page, so a pull
/// interrupted by a crash resumes from the last committed page.
#[async_trait]
pub trait PullTokenStore: Send + Sync {
    /// Read the last committed token for an entity, if any.
    async fn get(&self, entity: &str) -> Result<Option<PullToken>>;

    /// Commit a new token for an entity.
    async fn set(&self, entity: &str, token: &PullToken) -> Result<()>;
}

/// In-memory token store for testing. Tokens are lost on drop.
pub struct MemoryTokenStore {
    tokens: RwLock<HashMap<String, PullToken>>,
}

impl MemoryTokenStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PullTokenStore for MemoryTokenStore {
    async fn get(&self, entity: &str) -> Result<Option<PullToken>> {
        Ok(self.tokens.read().unwrap().get(entity).cloned())
    }

    async fn set(&self, entity: &str, token: &PullToken) -> Result<()> {
        self.tokens
            .write()
            .unwrap()
            .insert(entity.to_string(), token.clone());
        Ok(())
    }
}

/// File-backed token store: one JSON map of entity name to cursor.
///
/// Survives process restarts, which is what makes the pull token a valid
/// resumption checkpoint across app launches.
pub struct FileTokenStore {
    path: PathBuf,
    tokens: Mutex<HashMap<String, PullToken>>,
}

impl FileTokenStore {
    /// Open (or create) the token file at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tokens = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| Error::Serialization(format!("Invalid token file: {}", e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), "Opened pull-token store");
        Ok(Self {
            path,
            tokens: Mutex::new(tokens),
        })
    }

    async fn persist(&self, tokens: &HashMap<String, PullToken>) -> Result<()> {
        let json = serde_json::to_vec_pretty(tokens)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl PullTokenStore for FileTokenStore {
    async fn get(&self, entity: &str) -> Result<Option<PullToken>> {
        Ok(self.tokens.lock().await.get(entity).cloned())
    }

    async fn set(&self, entity: &str, token: &PullToken) -> Result<()> {
        let mut tokens = self.tokens.lock().await;
        tokens.insert(entity.to_string(), token.clone());
        self.persist(&tokens).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert!(store.get("patients").await.unwrap().is_none());

        let token = PullToken::new("cursor-1");
        store.set("patients", &token).await.unwrap();

        assert_eq!(store.get("patients").await.unwrap(), Some(token));
        assert!(store.get("appointments").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pull_tokens.json");

        {
            let store = FileTokenStore::open(&path).await.unwrap();
            store
                .set("facilities", &PullToken::new("cursor-42"))
                .await
                .unwrap();
        }

        let reopened = FileTokenStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get("facilities").await.unwrap(),
            Some(PullToken::new("cursor-42"))
        );
    }

    #[tokio::test]
    async fn test_file_store_commits_latest_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pull_tokens.json");

        let store = FileTokenStore::open(&path).await.unwrap();
        store.set("patients", &PullToken::new("page-1")).await.unwrap();
        store.set("patients", &PullToken::new("page-2")).await.unwrap();

        assert_eq!(
            store.get("patients").await.unwrap(),
            Some(PullToken::new("page-2"))
        );
    }
}
