//! Run-status tracker.
//!
//! Owns the status sidecar file and its in-memory record. Lifecycle
//! transitions are written through immediately; per-item completions are
//! batched so large runs don't rewrite the file once per item.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::error::StateError;
use super::file::{read_json, write_json};
use super::types::{LifecycleState, RunStatus};
use crate::types::SyncMode;

/// Completions buffered before the record is flushed.
pub const FLUSH_EVERY: u64 = 10;

#[derive(Debug)]
pub struct StatusTracker {
    path: PathBuf,
    status: RunStatus,
    unflushed: u64,
}

impl StatusTracker {
    /// Load the persisted record, recovering from a crashed prior run.
    ///
    /// - missing file: a default record is written
    /// - `running:*` state: the previous owner is gone, so the record is
    ///   reset to `idle` with the pid cleared and written back
    /// - corrupt or unreadable file: the default record is used in memory
    ///   only, leaving the file untouched
    pub fn init(path: &Path) -> Self {
        let mut tracker = Self {
            path: path.to_path_buf(),
            status: RunStatus::default(),
            unflushed: 0,
        };

        match read_json::<RunStatus>(path) {
            Ok(status) => {
                tracker.status = status;
                if tracker.status.state.is_running() {
                    tracing::warn!(
                        state = %tracker.status.state,
                        pid = ?tracker.status.pid,
                        "Previous sync did not finish cleanly; resetting status to idle"
                    );
                    tracker.status.state = LifecycleState::Idle;
                    tracker.status.pid = None;
                    tracker.persist();
                }
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!("No status file at {}, creating one", path.display());
                tracker.persist();
            }
            Err(e) => match recover_unknown_running(path) {
                Some(status) => {
                    tracing::warn!(
                        "Previous sync did not finish cleanly ({}); resetting status to idle",
                        e
                    );
                    tracker.status = status;
                    tracker.persist();
                }
                None => {
                    tracing::warn!("{}; using default status without overwriting it", e);
                }
            },
        }

        tracker
    }

    /// Load the record without normalizing or writing anything.
    ///
    /// Returns `Ok(None)` when no status file exists yet.
    pub fn read(path: &Path) -> Result<Option<RunStatus>, StateError> {
        match read_json::<RunStatus>(path) {
            Ok(status) => Ok(Some(status)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn start_run(
        &mut self,
        mode: SyncMode,
        expected_total: u64,
        last_sync: Option<DateTime<Utc>>,
    ) {
        self.status.state = LifecycleState::Running(mode);
        self.status.pid = Some(std::process::id());
        self.status.started_at = Some(Utc::now());
        self.status.total_items = expected_total;
        self.status.completed_items = 0;
        self.status.last_sync = last_sync;
        self.persist();
    }

    /// Adjust the expected total as real counts become known.
    pub fn update_expected_total(&mut self, delta: i64) {
        self.status.total_items = self.status.total_items.saturating_add_signed(delta);
        self.persist();
    }

    /// Count one finished item; flushes every [`FLUSH_EVERY`] items or when
    /// the expected total is reached.
    pub fn record_completion(&mut self) {
        self.status.completed_items += 1;
        self.unflushed += 1;
        let reached_total =
            self.status.total_items > 0 && self.status.completed_items >= self.status.total_items;
        if self.unflushed >= FLUSH_EVERY || reached_total {
            self.persist();
        }
    }

    pub fn end_run(&mut self, success: bool, summary: &str) {
        self.status.state = if success {
            LifecycleState::Idle
        } else {
            LifecycleState::Failed
        };
        self.status.pid = None;
        self.status.last_run_summary = Some(summary.to_string());
        self.persist();
    }

    /// Record a newly persisted watermark.
    pub fn record_watermark(&mut self, last_sync: DateTime<Utc>) {
        self.status.last_sync = Some(last_sync);
        self.persist();
    }

    /// Write the in-memory record to disk.
    pub fn flush(&mut self) -> Result<(), StateError> {
        self.status.updated_at = Some(Utc::now());
        write_json(&self.path, &self.status)?;
        self.unflushed = 0;
        Ok(())
    }

    /// Flush, logging instead of failing: status is advisory and a failed
    /// write must not abort a run.
    fn persist(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Could not update status file: {}", e);
        }
    }
}

/// A `running:<mode>` record whose mode this build does not know is still a
/// stale run. Returns it rewritten as `idle` with the pid cleared, or `None`
/// if the file is corrupt for any other reason.
fn recover_unknown_running(path: &Path) -> Option<RunStatus> {
    let mut raw: serde_json::Value = read_json(path).ok()?;
    let record = raw.as_object_mut()?;
    let state = record.get("state")?.as_str()?;
    if !state.starts_with("running:") {
        return None;
    }
    record.insert("state".into(), LifecycleState::Idle.to_string().into());
    record.insert("pid".into(), serde_json::Value::Null);
    serde_json::from_value(raw).ok()
}
