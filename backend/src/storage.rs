use std::path::{Path, PathBuf};
use async_trait::async_trait;
use shared::VoteHistory;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable home of the vote history document.
#[async_trait]
pub trait HistoryStorage: Send + Sync {
    /// `None` when nothing usable is stored; never an error.
    async fn load(&self) -> Option<VoteHistory>;
    async fn save(&self, history: &VoteHistory) -> Result<(), StorageError>;
}

pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl HistoryStorage for JsonFileStorage {
    async fn load(&self) -> Option<VoteHistory> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read vote history {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(history) => Some(history),
            Err(e) => {
                warn!("Ignoring malformed vote history {}: {}", self.path.display(), e);
                None
            }
        }
    }

    async fn save(&self, history: &VoteHistory) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(history)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}
