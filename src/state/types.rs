//! Persisted records for the state module.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::SyncMode;

/// Lifecycle of a sync run as seen by external status readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Running(SyncMode),
    Failed,
}

impl LifecycleState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Running(mode) => write!(f, "running:{}", mode.as_str()),
            Self::Failed => f.write_str("failed"),
        }
    }
}

impl FromStr for LifecycleState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "failed" => Ok(Self::Failed),
            other => match other.strip_prefix("running:") {
                Some(mode) => SyncMode::from_str(mode)
                    .map(Self::Running)
                    .ok_or_else(|| format!("unknown sync mode '{mode}'")),
                None => Err(format!("unknown lifecycle state '{other}'")),
            },
        }
    }
}

impl Serialize for LifecycleState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LifecycleState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The run-status sidecar record.
///
/// Invariant: `state` is `Running(_)` exactly when `pid` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatus {
    pub state: LifecycleState,
    /// Process that owns the running sync.
    #[serde(default)]
    pub pid: Option<u32>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// Items expected this run; grows as listings are fetched.
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub completed_items: u64,
    /// Watermark of the last successful sync.
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_run_summary: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for RunStatus {
    fn default() -> Self {
        Self {
            state: LifecycleState::Idle,
            pid: None,
            started_at: None,
            total_items: 0,
            completed_items: 0,
            last_sync: None,
            last_run_summary: None,
            updated_at: None,
        }
    }
}

/// The sync-state sidecar record: the single watermark of record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    /// `None` means "never synced" and forces an initial sync.
    #[serde(default)]
    pub last_sync_timestamp: Option<DateTime<Utc>>,
}
