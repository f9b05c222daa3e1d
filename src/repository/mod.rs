//! Checkpoint repositories
//!
//! A [`StateRepository`] persists [`ExperimentState`] values keyed by
//! experiment identifier. The runner needs exactly three operations:
//!
//! | Operation | Contract |
//! |-----------|----------|
//! | `save` | store (or overwrite) the checkpoint |
//! | `load` | return the stored checkpoint, error if absent |
//! | `exists` | whether a checkpoint is stored |
//!
//! Any storage format is acceptable as long as it round-trips an
//! `ExperimentState` losslessly.
//!
//! ## Backends
//!
//! - [`MemoryStateRepository`]: stores the values themselves, no encoding
//! - [`KvStateRepository`]: versioned JSON [`CheckpointRecord`]s in any
//!   [`KvStore`](crate::kv::KvStore)

mod kv;
mod memory;

pub use kv::{CheckpointRecord, KvStateRepository, CHECKPOINT_FORMAT_VERSION};
pub use memory::MemoryStateRepository;

use std::future::Future;

use crate::experiment::ExperimentState;
use crate::Result;

/// Async storage for experiment checkpoints.
pub trait StateRepository<T>: Send + Sync {
    /// Store `state` under `experiment_id`, replacing any previous checkpoint.
    fn save(
        &self,
        experiment_id: &str,
        state: ExperimentState<T>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Load the checkpoint stored under `experiment_id`.
    ///
    /// Fails with [`crate::Error::CheckpointNotFound`] if there is none.
    fn load(&self, experiment_id: &str) -> impl Future<Output = Result<ExperimentState<T>>> + Send;

    /// Whether a checkpoint is stored under `experiment_id`.
    fn exists(&self, experiment_id: &str) -> impl Future<Output = Result<bool>> + Send;
}
