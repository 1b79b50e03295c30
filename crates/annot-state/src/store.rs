//! State store: parse and serialize [`UserState`] over a [`StateStorage`]

use crate::error::StorageResult;
use crate::model::UserState;
use crate::storage::StateStorage;

/// Loads, saves and clears the persisted state
#[derive(Debug)]
pub struct StateStore<S> {
    storage: S,
}

impl<S: StateStorage> StateStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Underlying storage
    #[inline]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the persisted state
    ///
    /// An absent, unreadable or corrupt blob yields the default state.
    pub fn load(&self) -> UserState {
        let blob = match self.storage.read() {
            Ok(Some(blob)) => blob,
            Ok(None) => return UserState::default(),
            Err(e) => {
                tracing::warn!(error = %e, "stored state unreadable, starting fresh");
                return UserState::default();
            }
        };

        match serde_json::from_str(&blob) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "stored state is corrupt, starting fresh");
                UserState::default()
            }
        }
    }

    /// Persist the full state
    ///
    /// # Errors
    /// Returns [`crate::StorageError`] if serialization or the write fails.
    pub fn save(&self, state: &UserState) -> StorageResult<()> {
        let blob = serde_json::to_string(state)?;
        self.storage.write(&blob)?;
        tracing::debug!(bytes = blob.len(), "state persisted");
        Ok(())
    }

    /// Delete the persisted state; in-memory state is the caller's
    ///
    /// # Errors
    /// Returns [`crate::StorageError`] if the backend cannot be modified.
    pub fn clear(&self) -> StorageResult<()> {
        self.storage.remove()?;
        tracing::info!("persisted state cleared");
        Ok(())
    }
}
