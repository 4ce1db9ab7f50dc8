//! In-memory snapshot backend using `DashMap`.
//!
//! Snapshots are lost on process restart; use [`super::FsBackend`] for
//! durable artifacts.

use dashmap::DashMap;

use super::SnapshotBackend;
use crate::Result;

/// In-memory snapshot backend.
///
/// # Example
///
/// ```rust
/// use trial_metrics::snapshot::{MemoryBackend, SnapshotBackend};
///
/// # fn main() -> trial_metrics::Result<()> {
/// let backend = MemoryBackend::new();
/// backend.put("exp-trial_id-1-metric_store.dat", b"{}".to_vec())?;
/// assert!(backend.exists("exp-trial_id-1-metric_store.dat")?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryBackend {
    blobs: DashMap<String, Vec<u8>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            blobs: DashMap::new(),
        }
    }

    /// Get the number of stored snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Check if no snapshots are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Remove all snapshots.
    pub fn clear(&self) {
        self.blobs.clear();
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotBackend for MemoryBackend {
    fn put(&self, key: &str, blob: Vec<u8>) -> Result<()> {
        self.blobs.insert(key.to_string(), blob);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.get(key).map(|v| v.value().clone()))
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.blobs.iter().map(|entry| entry.key().clone()).collect())
    }

    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.blobs.contains_key(key))
    }
}
