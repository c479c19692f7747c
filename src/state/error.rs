//! Error types for the sidecar state files.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing a state file.
#[derive(Error, Debug)]
pub enum StateError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file (or its temp sibling) could not be written or renamed.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file exists but does not hold a valid record.
    #[error("Corrupt state file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The in-memory record could not be serialized.
    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StateError {
    /// Whether this is a read of a file that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StateError::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
