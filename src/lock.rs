//! Exclusive-run lock.
//!
//! An advisory lock on a file in the data directory keeps a second sync
//! (e.g. a timer firing while a long run is still going) from touching the
//! same library and state files. The OS drops the lock when the process
//! exits, however it exits.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;

#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
    // Held for the lifetime of the guard; closing it releases the lock.
    _file: std::fs::File,
}

impl RunLock {
    /// Take the lock at `path`, failing immediately if another process holds it.
    pub async fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
        }

        let file = tokio::task::spawn_blocking({
            let path = path.to_path_buf();
            move || {
                let mut file = std::fs::OpenOptions::new()
                    .create(true)
                    .truncate(false)
                    .write(true)
                    .open(&path)
                    .with_context(|| format!("Failed to create lock file: {}", path.display()))?;
                file.try_lock_exclusive().map_err(|_| {
                    anyhow::anyhow!(
                        "Another photo-sync run is already in progress (lock: {})",
                        path.display()
                    )
                })?;
                // Informational only; the lock is what matters.
                let _ = file.set_len(0);
                let _ = writeln!(file, "{}", std::process::id());
                Ok::<std::fs::File, anyhow::Error>(file)
            }
        })
        .await??;

        Ok(Self {
            path: path.to_path_buf(),
            _file: file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
