//! Error types for the local store.

use std::path::PathBuf;

/// Errors that can occur while loading or flushing the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the snapshot file failed.
    #[error("snapshot IO error at {path}: {source}")]
    Io {
        /// The snapshot file.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The snapshot file is not valid JSON for [`AppData`](questly_types::AppData).
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
