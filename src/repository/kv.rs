//! Checkpoint repository over a key-value byte store
//!
//! Each checkpoint is one JSON document:
//!
//! ```text
//! checkpoint:{experiment_id} ──► {
//!     "format_version": 1,
//!     "experiment_id": "...",
//!     "saved_at": "2024-01-01T00:00:00Z",
//!     "state": { ExperimentState }
//! }
//! ```
//!
//! `serde_json` is built with `float_roundtrip`, so the Welford moments and
//! statistic history restore to the exact same `f64` bits.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::StateRepository;
use crate::experiment::ExperimentState;
use crate::kv::KvStore;
use crate::{Error, Result};

/// Current on-disk checkpoint format.
pub const CHECKPOINT_FORMAT_VERSION: u32 = 1;

const KEY_PREFIX: &str = "checkpoint:";

/// Versioned envelope around a stored checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointRecord<T> {
    format_version: u32,
    experiment_id: String,
    saved_at: DateTime<Utc>,
    state: ExperimentState<T>,
}

impl<T> CheckpointRecord<T> {
    /// Wrap a state, stamped with the current time.
    #[must_use]
    pub fn new(experiment_id: impl Into<String>, state: ExperimentState<T>) -> Self {
        Self {
            format_version: CHECKPOINT_FORMAT_VERSION,
            experiment_id: experiment_id.into(),
            saved_at: Utc::now(),
            state,
        }
    }

    /// Format version the record was written with.
    #[must_use]
    pub const fn format_version(&self) -> u32 {
        self.format_version
    }

    /// Experiment the checkpoint belongs to.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// When the checkpoint was written.
    #[must_use]
    pub const fn saved_at(&self) -> DateTime<Utc> {
        self.saved_at
    }

    /// The checkpointed state.
    #[must_use]
    pub const fn state(&self) -> &ExperimentState<T> {
        &self.state
    }

    /// Unwrap the checkpointed state.
    #[must_use]
    pub fn into_state(self) -> ExperimentState<T> {
        self.state
    }
}

/// Stores [`CheckpointRecord`]s as JSON in a [`KvStore`].
///
/// # Example
///
/// ```rust,no_run
/// use earlysign::kv::MemoryKvStore;
/// use earlysign::repository::{KvStateRepository, StateRepository};
///
/// # async fn example() -> earlysign::Result<()> {
/// let repository = KvStateRepository::new(MemoryKvStore::new());
/// assert!(!StateRepository::<u64>::exists(&repository, "trial-001").await?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct KvStateRepository<S> {
    store: S,
}

impl<S: KvStore> KvStateRepository<S> {
    /// Wrap a key-value store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store (for inspection/testing).
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.store
    }

    /// Storage key of an experiment's checkpoint.
    #[must_use]
    pub fn key(experiment_id: &str) -> String {
        format!("{KEY_PREFIX}{experiment_id}")
    }

    /// Load the full record, including its metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a record of a supported version.
    pub async fn record<T>(&self, experiment_id: &str) -> Result<Option<CheckpointRecord<T>>>
    where
        T: DeserializeOwned,
    {
        match self.store.get(&Self::key(experiment_id)).await? {
            Some(bytes) => decode(experiment_id, &bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Delete an experiment's checkpoint. No-op if absent.
    ///
    /// # Errors
    ///
    /// Propagates the store's error.
    pub async fn remove(&self, experiment_id: &str) -> Result<()> {
        self.store.delete(&Self::key(experiment_id)).await
    }
}

fn decode<T: DeserializeOwned>(experiment_id: &str, bytes: &[u8]) -> Result<CheckpointRecord<T>> {
    let record: CheckpointRecord<T> = serde_json::from_slice(bytes)?;
    if record.format_version != CHECKPOINT_FORMAT_VERSION {
        return Err(Error::Storage(format!(
            "checkpoint for '{experiment_id}' has format version {}, expected {CHECKPOINT_FORMAT_VERSION}",
            record.format_version
        )));
    }
    if record.experiment_id != experiment_id {
        return Err(Error::Storage(format!(
            "checkpoint stored under '{experiment_id}' belongs to '{}'",
            record.experiment_id
        )));
    }
    Ok(record)
}

impl<S, T> StateRepository<T> for KvStateRepository<S>
where
    S: KvStore,
    T: Serialize + DeserializeOwned + Send,
{
    async fn save(&self, experiment_id: &str, state: ExperimentState<T>) -> Result<()> {
        let bytes = serde_json::to_vec(&CheckpointRecord::new(experiment_id, state))?;
        self.store.set(&Self::key(experiment_id), bytes).await
    }

    async fn load(&self, experiment_id: &str) -> Result<ExperimentState<T>> {
        self.record(experiment_id)
            .await?
            .map(CheckpointRecord::into_state)
            .ok_or_else(|| Error::CheckpointNotFound(experiment_id.to_string()))
    }

    async fn exists(&self, experiment_id: &str) -> Result<bool> {
        self.store.exists(&Self::key(experiment_id)).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::condition::ConditionState;
    use crate::experiment::{Signal, SignalEvent};
    use crate::kv::MemoryKvStore;
    use crate::statistic::{RunningMoments, StatisticInternals, StatisticState};

    fn awkward_state() -> ExperimentState<u64> {
        ExperimentState {
            statistic_state: StatisticState {
                history: vec![(1, 0.1 + 0.2), (2, -1.0 / 3.0), (3, f64::MIN_POSITIVE)],
                internals: StatisticInternals::Means {
                    arm1: RunningMoments::from_parts(3, std::f64::consts::PI, 1e-300),
                    arm2: RunningMoments::from_parts(3, -0.000_123_456_789_012_345_67, 12_345.678_901_234_567),
                },
            },
            conditions_state: BTreeMap::from([(
                "efficacy_boundary".to_string(),
                ConditionState::Sticky { has_crossed: true },
            )]),
            signal_history: vec![SignalEvent::new(3, "efficacy_boundary", Signal::ConditionMet)],
            previous_condition_states: BTreeMap::from([("efficacy_boundary".to_string(), true)]),
        }
    }

    #[tokio::test]
    async fn test_round_trip_is_lossless() {
        let repo = KvStateRepository::new(MemoryKvStore::new());
        repo.save("trial-001", awkward_state()).await.unwrap();

        let loaded: ExperimentState<u64> = repo.load("trial-001").await.unwrap();
        assert_eq!(loaded, awkward_state());
        assert!(repo.inner().exists("checkpoint:trial-001").await.unwrap());
    }

    #[tokio::test]
    async fn test_record_metadata() {
        let repo = KvStateRepository::new(MemoryKvStore::new());
        let before = Utc::now();
        repo.save("trial-002", awkward_state()).await.unwrap();

        let record: CheckpointRecord<u64> = repo.record("trial-002").await.unwrap().unwrap();
        assert_eq!(record.format_version(), CHECKPOINT_FORMAT_VERSION);
        assert_eq!(record.experiment_id(), "trial-002");
        assert!(record.saved_at() >= before);
        assert_eq!(record.state().observations(), 3);
    }

    #[tokio::test]
    async fn test_missing_checkpoint() {
        let repo = KvStateRepository::new(MemoryKvStore::new());
        assert!(!StateRepository::<u64>::exists(&repo, "ghost").await.unwrap());
        let result: Result<ExperimentState<u64>> = repo.load("ghost").await;
        assert!(matches!(result, Err(Error::CheckpointNotFound(_))));
    }

    #[tokio::test]
    async fn test_rejects_unknown_format_version() {
        let repo = KvStateRepository::new(MemoryKvStore::new());
        let mut record = CheckpointRecord::new("trial-003", awkward_state());
        record.format_version = 99;
        repo.inner()
            .set("checkpoint:trial-003", serde_json::to_vec(&record).unwrap())
            .await
            .unwrap();

        let result: Result<ExperimentState<u64>> = repo.load("trial-003").await;
        assert!(matches!(result, Err(Error::Storage(msg)) if msg.contains("format version 99")));
    }

    #[tokio::test]
    async fn test_rejects_corrupt_bytes() {
        let repo = KvStateRepository::new(MemoryKvStore::new());
        repo.inner()
            .set("checkpoint:trial-004", b"not json".to_vec())
            .await
            .unwrap();
        let result: Result<ExperimentState<u64>> = repo.load("trial-004").await;
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[tokio::test]
    async fn test_remove() {
        let repo = KvStateRepository::new(MemoryKvStore::new());
        repo.save("trial-005", awkward_state()).await.unwrap();
        repo.remove("trial-005").await.unwrap();
        assert!(!StateRepository::<u64>::exists(&repo, "trial-005").await.unwrap());
    }
}
