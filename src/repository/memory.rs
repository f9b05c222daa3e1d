//! In-memory checkpoint repository

use dashmap::DashMap;

use super::StateRepository;
use crate::experiment::ExperimentState;
use crate::{Error, Result};

/// Keeps checkpoints as values in a `DashMap`.
///
/// Loads return clones, so later saves never alias a loaded state.
#[derive(Debug)]
pub struct MemoryStateRepository<T> {
    states: DashMap<String, ExperimentState<T>>,
}

impl<T> MemoryStateRepository<T> {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: DashMap::new(),
        }
    }

    /// Number of stored checkpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no checkpoint is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl<T> Default for MemoryStateRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StateRepository<T> for MemoryStateRepository<T>
where
    T: Clone + Send + Sync,
{
    async fn save(&self, experiment_id: &str, state: ExperimentState<T>) -> Result<()> {
        self.states.insert(experiment_id.to_string(), state);
        Ok(())
    }

    async fn load(&self, experiment_id: &str) -> Result<ExperimentState<T>> {
        self.states
            .get(experiment_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::CheckpointNotFound(experiment_id.to_string()))
    }

    async fn exists(&self, experiment_id: &str) -> Result<bool> {
        Ok(self.states.contains_key(experiment_id))
    }
}
