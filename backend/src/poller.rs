use std::sync::Arc;
use std::time::Duration;
use shared::VoteTime;
use time::UtcOffset;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use crate::source::{SnapshotSource, SourceError};
use crate::storage::HistoryStorage;
use crate::store::{StoreError, VoteHistoryStore};

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Poller {
    source: Arc<dyn SnapshotSource>,
    store: Arc<VoteHistoryStore>,
    storage: Arc<dyn HistoryStorage>,
    offset: UtcOffset,
    fetch_timeout: Duration,
}

impl Poller {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        store: Arc<VoteHistoryStore>,
        storage: Arc<dyn HistoryStorage>,
        offset: UtcOffset,
        fetch_timeout: Duration,
    ) -> Self {
        Self { source, store, storage, offset, fetch_timeout }
    }

    /// One fetch-record-persist cycle. A failed fetch leaves the store
    /// untouched; a failed save keeps the recorded samples for the next one.
    pub async fn poll_once(&self) -> Result<usize, PollError> {
        let timestamp = VoteTime::now(self.offset);
        let samples = timeout(self.fetch_timeout, self.source.fetch())
            .await
            .map_err(|_| PollError::Timeout(self.fetch_timeout))??;

        let accepted = self.store.record_batch(&samples, timestamp)?;
        debug!("Recorded {} of {} samples at {}", accepted, samples.len(), timestamp);

        self.store.persist(self.storage.as_ref()).await?;
        Ok(accepted)
    }

    pub async fn run(self, period: Duration) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("📡 Vote poller started ({}s interval)", period.as_secs());

        loop {
            ticker.tick().await;
            match self.poll_once().await {
                Ok(_) => {}
                Err(PollError::Store(StoreError::Storage(e))) => {
                    error!("Failed to persist vote history: {}", e);
                }
                Err(e) => warn!("Poll failed: {}", e),
            }
        }
    }
}
