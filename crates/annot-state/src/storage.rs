//! Storage backends for the persisted state blob
//!
//! The state lives under one well-known key as an opaque string. Backends
//! only move bytes; parsing and defaults are the store's concern.

use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Key the state blob is stored under
pub const STORAGE_KEY: &str = "switchable_persona_annotation_state_v1";

/// Key/value storage holding the state blob
#[cfg_attr(test, mockall::automock)]
pub trait StateStorage: Send + Sync {
    /// Read the stored blob, `None` if absent
    ///
    /// # Errors
    /// Returns [`StorageError`] if the backend cannot be read.
    fn read(&self) -> StorageResult<Option<String>>;

    /// Replace the stored blob
    ///
    /// # Errors
    /// Returns [`StorageError`] if the backend cannot be written.
    fn write(&self, blob: &str) -> StorageResult<()>;

    /// Delete the stored blob; absent is not an error
    ///
    /// # Errors
    /// Returns [`StorageError`] if the backend cannot be modified.
    fn remove(&self) -> StorageResult<()>;
}

impl<T: StateStorage + ?Sized> StateStorage for Arc<T> {
    fn read(&self) -> StorageResult<Option<String>> {
        (**self).read()
    }

    fn write(&self, blob: &str) -> StorageResult<()> {
        (**self).write(blob)
    }

    fn remove(&self) -> StorageResult<()> {
        (**self).remove()
    }
}

/// File-backed storage: `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage for the default key inside `dir`
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_key(dir, STORAGE_KEY)
    }

    /// Storage for a custom key inside `dir`
    pub fn with_key(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{key}.json")),
        }
    }

    /// Path of the backing file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl StateStorage for FileStorage {
    fn read(&self) -> StorageResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io_error(&self.path, e)),
        }
    }

    fn write(&self, blob: &str) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::io_error(parent, e))?;
        }

        // Rename keeps readers from seeing a truncated blob
        let temp = self.temp_path();
        std::fs::write(&temp, blob).map_err(|e| StorageError::io_error(&temp, e))?;
        std::fs::rename(&temp, &self.path).map_err(|e| StorageError::io_error(&self.path, e))
    }

    fn remove(&self) -> StorageResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io_error(&self.path, e)),
        }
    }
}

/// In-memory storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blob: Mutex<Option<String>>,
}

impl MemoryStorage {
    /// Empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with `blob`
    #[must_use]
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
        }
    }
}

impl StateStorage for MemoryStorage {
    fn read(&self) -> StorageResult<Option<String>> {
        Ok(self.blob.lock().clone())
    }

    fn write(&self, blob: &str) -> StorageResult<()> {
        *self.blob.lock() = Some(blob.to_string());
        Ok(())
    }

    fn remove(&self) -> StorageResult<()> {
        *self.blob.lock() = None;
        Ok(())
    }
}
