//! Error types for trial-metrics
//!
//! Data-correctness failures are errors; presentation mismatches (such as a
//! trial label list of the wrong length) are logged diagnostics instead.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// trial-metrics error types
#[derive(Error, Debug)]
pub enum Error {
    /// Input that cannot be reduced (e.g. mean or sum of zero samples)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No snapshot matched the requested key or pattern
    #[error("Snapshot not found: {0}")]
    NotFound(String),

    /// Snapshot blob could not be encoded, decoded, or (de)compressed
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Columnar export error (Arrow/Parquet)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Chart renderer failed
    #[error("Render error: {0}")]
    Render(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Invalid glob pattern for snapshot lookup
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] globset::Error),
}
