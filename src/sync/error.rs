use std::path::PathBuf;

use thiserror::Error;

use crate::library::ApiError;

/// Failures that end a run early.
///
/// Per-item and per-album problems never surface here; they are counted on
/// the [`RunResult`](super::RunResult) instead.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Could not create sync directory {path}: {source}")]
    RootContainer {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Listing {listing} failed: {source}")]
    Listing {
        listing: &'static str,
        source: ApiError,
    },
}

impl SyncError {
    pub(crate) fn listing(listing: &'static str) -> impl FnOnce(ApiError) -> Self {
        move |source| SyncError::Listing { listing, source }
    }
}
