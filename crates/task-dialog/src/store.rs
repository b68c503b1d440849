//! Persistence of per-session conversation records

use crate::{ConversationRecord, SessionId, StoreError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Durable home of conversation records.
///
/// Stores do no locking of their own across calls; the engine serializes
/// load and save for a session.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn load(&self, session: &SessionId) -> Result<Option<ConversationRecord>, StoreError>;

    async fn save(&self, session: &SessionId, record: &ConversationRecord)
        -> Result<(), StoreError>;

    async fn remove(&self, session: &SessionId) -> Result<(), StoreError>;

    /// Drop records untouched for longer than `max_idle`; returns how many.
    async fn expire_idle(&self, max_idle: Duration) -> Result<usize, StoreError>;
}

#[derive(Default)]
pub struct MemoryTaskStore {
    records: RwLock<HashMap<SessionId, ConversationRecord>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn load(&self, session: &SessionId) -> Result<Option<ConversationRecord>, StoreError> {
        Ok(self.records.read().get(session).cloned())
    }

    async fn save(
        &self,
        session: &SessionId,
        record: &ConversationRecord,
    ) -> Result<(), StoreError> {
        self.records.write().insert(session.clone(), record.clone());
        Ok(())
    }

    async fn remove(&self, session: &SessionId) -> Result<(), StoreError> {
        self.records.write().remove(session);
        Ok(())
    }

    async fn expire_idle(&self, max_idle: Duration) -> Result<usize, StoreError> {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|_, record| !record.is_idle_for(max_idle));
        Ok(before - records.len())
    }
}

/// One pretty-printed JSON document per session inside a directory.
pub struct JsonFileTaskStore {
    dir: PathBuf,
}

impl JsonFileTaskStore {
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn path_for(&self, session: &SessionId) -> Result<PathBuf, StoreError> {
        let id = session.as_str();
        let safe = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(StoreError::InvalidSessionId(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }
}

#[async_trait]
impl TaskStore for JsonFileTaskStore {
    async fn load(&self, session: &SessionId) -> Result<Option<ConversationRecord>, StoreError> {
        let path = self.path_for(session)?;
        match tokio::fs::read(&path).await {
            Ok(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(
        &self,
        session: &SessionId,
        record: &ConversationRecord,
    ) -> Result<(), StoreError> {
        let path = self.path_for(session)?;
        let json = serde_json::to_vec_pretty(record)?;
        // Write then rename so a crash never leaves half a record behind.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, session: &SessionId) -> Result<(), StoreError> {
        let path = self.path_for(session)?;
        match tokio::fs::remove_file(&path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    async fn expire_idle(&self, max_idle: Duration) -> Result<usize, StoreError> {
        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let raw = tokio::fs::read(&path).await?;
            let record: ConversationRecord = match serde_json::from_slice(&raw) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable record");
                    continue;
                }
            };
            if record.is_idle_for(max_idle) {
                tokio::fs::remove_file(&path).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
