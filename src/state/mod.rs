//! Sidecar state files.
//!
//! Two small JSON records live in the data directory:
//! - the run status (`status.json`), written by [`StatusTracker`] and read by
//!   external monitors
//! - the sync watermark (`sync_state.json`), owned by [`SyncStateStore`]

pub mod error;
mod file;
pub mod status;
pub mod sync_state;
pub mod types;

pub use error::StateError;
pub use status::StatusTracker;
pub use sync_state::SyncStateStore;
pub use types::{LifecycleState, RunStatus, SyncState};
