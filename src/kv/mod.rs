//! Key-value storage for checkpoint payloads
//!
//! Provides a minimal async byte store that checkpoint repositories build on:
//! - In-memory backend ([`MemoryKvStore`]) for tests and single-process runs
//! - Async-first API so durable backends can do real I/O
//!
//! # Example
//!
//! ```rust,no_run
//! use earlysign::kv::{KvStore, MemoryKvStore};
//!
//! # async fn example() -> earlysign::Result<()> {
//! let store = MemoryKvStore::new();
//!
//! store.set("checkpoint:trial-001", b"{}".to_vec()).await?;
//! assert!(store.exists("checkpoint:trial-001").await?);
//!
//! store.delete("checkpoint:trial-001").await?;
//! assert_eq!(store.get("checkpoint:trial-001").await?, None);
//! # Ok(())
//! # }
//! ```

mod memory;

pub use memory::MemoryKvStore;

use crate::Result;
use std::future::Future;

/// Async key-value byte store.
///
/// Implementations must be shareable across tasks; returned futures are `Send`.
pub trait KvStore: Send + Sync {
    /// Get a value by key.
    ///
    /// Returns `None` if the key doesn't exist.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Set a value for a key.
    ///
    /// Overwrites any existing value.
    fn set(&self, key: &str, value: Vec<u8>) -> impl Future<Output = Result<()>> + Send;

    /// Delete a key.
    ///
    /// No-op if the key doesn't exist.
    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> impl Future<Output = Result<bool>> + Send;
}
