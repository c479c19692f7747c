//! Persisted sync watermark.

use std::path::{Path, PathBuf};

use super::error::StateError;
use super::file::{read_json, write_json};
use super::types::SyncState;

#[derive(Debug, Clone)]
pub struct SyncStateStore {
    path: PathBuf,
}

impl SyncStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the watermark, treating a missing or unreadable file as "never
    /// synced" so the next run falls back to a full sync.
    pub fn load(&self) -> SyncState {
        match read_json::<SyncState>(&self.path) {
            Ok(state) => state,
            Err(e) if e.is_not_found() => {
                tracing::info!("No sync state at {}; starting fresh", self.path.display());
                SyncState::default()
            }
            Err(e) => {
                tracing::warn!("{}; ignoring it and starting fresh", e);
                SyncState::default()
            }
        }
    }

    pub fn save(&self, state: &SyncState) -> Result<(), StateError> {
        write_json(&self.path, state)
    }

    /// Delete the state file. Returns `false` if there was nothing to delete.
    pub fn reset(&self) -> Result<bool, StateError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StateError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
