//! Error types for state persistence and snapshots

use std::path::PathBuf;

/// Storage backend errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// IO error on the backing file
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// State could not be serialized
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StorageError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Export/import errors
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Import artifact is not a JSON object shaped like a state
    #[error("malformed import: {0}")]
    MalformedImport(String),

    /// Export serialization failed
    #[error("export failed: {0}")]
    Export(#[from] serde_json::Error),
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;
