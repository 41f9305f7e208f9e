use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use shared::{NomineeId, Nominees, VoteHistory, VoteSample, VoteSnapshot, VoteTime};
use time::UtcOffset;
use tracing::{debug, error, info, warn};
use crate::storage::{HistoryStorage, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Vote history lock is poisoned")]
    LockFailed,
    #[error("Failed to persist vote history: {0}")]
    Storage(#[from] StorageError),
}

/// Append-only vote history for the configured nominees.
///
/// Every operation takes the one lock for its whole duration, so readers see
/// either none or all of a recorded batch. The lock is never held across I/O.
pub struct VoteHistoryStore {
    known: HashSet<NomineeId>,
    document: Mutex<VoteHistory>,
}

impl VoteHistoryStore {
    pub fn new(nominees: &Nominees, document: VoteHistory) -> Self {
        Self {
            known: nominees.id_set(),
            document: Mutex::new(document),
        }
    }

    pub async fn load(
        storage: &dyn HistoryStorage,
        nominees: &Nominees,
        offset: UtcOffset,
    ) -> Self {
        let document = match storage.load().await {
            Some(document) => {
                info!(
                    "Loaded vote history with {} samples for {} nominees",
                    document.sample_count(),
                    document.history.len()
                );
                document
            }
            None => {
                info!("Starting with an empty vote history");
                VoteHistory::empty(VoteTime::now(offset))
            }
        };
        Self::new(nominees, document)
    }

    fn lock(&self) -> Result<MutexGuard<'_, VoteHistory>, StoreError> {
        self.document.lock().map_err(|e| {
            error!("Failed to acquire vote history lock: {}", e);
            StoreError::LockFailed
        })
    }

    pub fn record(&self, nominee: &str, vote_count: u64, timestamp: VoteTime) -> Result<bool, StoreError> {
        self.record_batch(&[(NomineeId::from(nominee), vote_count)], timestamp)
            .map(|accepted| accepted == 1)
    }

    /// Records one poll's worth of samples with a shared timestamp and returns
    /// how many were accepted. A timestamp older than `last_update_time` is
    /// raised to it so every nominee's samples stay non-decreasing.
    pub fn record_batch(&self, samples: &[(NomineeId, u64)], timestamp: VoteTime) -> Result<usize, StoreError> {
        let mut document = self.lock()?;
        let timestamp = if timestamp < document.last_update_time {
            warn!(
                "Clock went backwards ({} < {}), recording at {}",
                timestamp, document.last_update_time, document.last_update_time
            );
            document.last_update_time
        } else {
            timestamp
        };
        let mut accepted = 0;

        for (nominee, vote_count) in samples {
            if !self.known.contains(nominee) {
                warn!("Skipping unknown nominee {}", nominee);
                continue;
            }
            debug!("Recording {} votes for {} at {}", vote_count, nominee, timestamp);
            document.push(nominee.clone(), VoteSample { vote_count: *vote_count, timestamp });
            accepted += 1;
        }

        if accepted > 0 {
            document.last_update_time = timestamp;
        }
        Ok(accepted)
    }

    pub fn query(&self, since: Option<VoteTime>) -> Result<VoteHistory, StoreError> {
        let document = self.lock()?;
        Ok(match since {
            Some(since) => document.since(since),
            None => document.clone(),
        })
    }

    /// `None` until the first sample has been recorded.
    pub fn latest_snapshot(&self) -> Result<Option<VoteSnapshot>, StoreError> {
        let document = self.lock()?;
        let latest = document.latest();
        if latest.is_empty() {
            return Ok(None);
        }

        let mut snapshot = VoteSnapshot::default();
        for id in &self.known {
            snapshot.insert(id.clone(), latest.get(id.as_str()));
        }
        Ok(Some(snapshot))
    }

    pub async fn persist(&self, storage: &dyn HistoryStorage) -> Result<(), StoreError> {
        let document = self.query(None)?;
        storage.save(&document).await?;
        Ok(())
    }
}
