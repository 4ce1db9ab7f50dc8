//! Snapshot persistence for metric stores
//!
//! A [`SnapshotGateway`] serializes the full state of a [`MetricStore`] into a
//! blob and hands it to a [`SnapshotBackend`]. Keys embed the store name and
//! trial id, so every trial boundary produces its own artifact:
//!
//! ```text
//! {name}-trial_id-{current_trial_id}-{base_filename}
//! ```
//!
//! # Example
//!
//! ```rust
//! use trial_metrics::snapshot::{MemoryBackend, SnapshotGateway};
//! use trial_metrics::store::MetricStore;
//!
//! # fn main() -> trial_metrics::Result<()> {
//! let gateway = SnapshotGateway::new(MemoryBackend::new());
//! let mut store = MetricStore::new("exp");
//!
//! store.add_metric("Accuracy", 80.0);
//! let key = store.next_trial(&gateway)?;
//! assert_eq!(key, "exp-trial_id-1-metric_store.dat");
//!
//! let restored = gateway.load_latest("exp-trial_id")?;
//! assert_eq!(restored.metrics(), store.metrics());
//! # Ok(())
//! # }
//! ```

mod codec;
mod fs;
mod memory;

#[cfg(feature = "compression")]
pub use codec::Compression;
pub use fs::FsBackend;
pub use memory::MemoryBackend;

use globset::{Glob, GlobMatcher};

use crate::store::MetricStore;
use crate::{Error, Result};

/// Default base filename appended to every snapshot key.
pub const DEFAULT_BASE_FILENAME: &str = "metric_store.dat";

/// Blob storage for snapshots, keyed by string.
///
/// Writes are whole-blob; a `put` on an existing key replaces it.
pub trait SnapshotBackend {
    /// Store a blob under `key`.
    ///
    /// # Errors
    ///
    /// Returns error if the blob cannot be written
    fn put(&self, key: &str, blob: Vec<u8>) -> Result<()>;

    /// Fetch the blob stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns error if the blob exists but cannot be read
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// List every stored key.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be enumerated
    fn keys(&self) -> Result<Vec<String>>;

    /// Check if a key exists.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be queried
    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Saves and restores [`MetricStore`] snapshots through a backend.
#[derive(Debug)]
pub struct SnapshotGateway<B> {
    backend: B,
    base_filename: String,
    #[cfg(feature = "compression")]
    compression: Option<Compression>,
}

impl<B: SnapshotBackend> SnapshotGateway<B> {
    /// Create a gateway with the default base filename and no compression.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            base_filename: DEFAULT_BASE_FILENAME.to_string(),
            #[cfg(feature = "compression")]
            compression: None,
        }
    }

    /// Set the base filename appended to snapshot keys.
    #[must_use]
    pub fn base_filename(mut self, base_filename: impl Into<String>) -> Self {
        self.base_filename = base_filename.into();
        self
    }

    /// Compress snapshot blobs with the given algorithm.
    #[cfg(feature = "compression")]
    #[must_use]
    pub const fn compression(mut self, compression: Compression) -> Self {
        self.compression = Some(compression);
        self
    }

    /// Get the underlying backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Key a snapshot of `store` is saved under.
    #[must_use]
    pub fn key_for(&self, store: &MetricStore) -> String {
        format!(
            "{}-trial_id-{}-{}",
            store.name(),
            store.current_trial_id(),
            self.base_filename
        )
    }

    /// Serialize the full store state and save it.
    ///
    /// # Returns
    ///
    /// The key the snapshot was saved under.
    ///
    /// # Errors
    ///
    /// Returns error if encoding or the backend write fails
    pub fn snapshot(&self, store: &MetricStore) -> Result<String> {
        let key = self.key_for(store);
        #[cfg(feature = "compression")]
        let blob = codec::encode(store, self.compression)?;
        #[cfg(not(feature = "compression"))]
        let blob = codec::encode(store)?;

        let size = blob.len();
        self.backend.put(&key, blob)?;
        tracing::info!(key = %key, bytes = size, "snapshot saved");
        Ok(key)
    }

    /// Load the snapshot stored under exactly `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such key exists, or a decode error
    pub fn load(&self, key: &str) -> Result<MetricStore> {
        let blob = self
            .backend
            .get(key)?
            .ok_or_else(|| Error::NotFound(key.to_string()))?;
        let store = codec::decode(&blob)?;
        tracing::info!(key = %key, trial_id = store.current_trial_id(), "snapshot loaded");
        Ok(store)
    }

    /// Load the snapshot matching `pattern`.
    ///
    /// An exact key wins. Otherwise every key matching the pattern (a glob if
    /// it contains `*`, `?` or `[`, a substring otherwise) is a candidate and
    /// the lexicographically greatest one is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no key matches, [`Error::Pattern`] for a
    /// malformed glob, or a decode error
    pub fn load_latest(&self, pattern: &str) -> Result<MetricStore> {
        if self.backend.exists(pattern)? {
            return self.load(pattern);
        }

        let matcher = KeyMatcher::new(pattern)?;
        let latest = self
            .backend
            .keys()?
            .into_iter()
            .filter(|key| matcher.matches(key))
            .max()
            .ok_or_else(|| Error::NotFound(format!("no snapshot matches {pattern:?}")))?;

        tracing::debug!(pattern = %pattern, key = %latest, "resolved snapshot pattern");
        self.load(&latest)
    }

    /// Load the greatest snapshot saved with this gateway's base filename.
    ///
    /// # Errors
    ///
    /// Same as [`load_latest`](Self::load_latest)
    pub fn load_latest_default(&self) -> Result<MetricStore> {
        self.load_latest(&self.base_filename)
    }
}

enum KeyMatcher {
    Glob(GlobMatcher),
    Substring(String),
}

impl KeyMatcher {
    fn new(pattern: &str) -> Result<Self> {
        if pattern.contains(['*', '?', '[']) {
            Ok(Self::Glob(Glob::new(pattern)?.compile_matcher()))
        } else {
            Ok(Self::Substring(pattern.to_string()))
        }
    }

    fn matches(&self, key: &str) -> bool {
        match self {
            Self::Glob(glob) => {
                let file_name = key.rsplit('/').next().unwrap_or(key);
                glob.is_match(key) || glob.is_match(file_name)
            }
            Self::Substring(needle) => key.contains(needle.as_str()),
        }
    }
}
