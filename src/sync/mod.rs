//! Sync orchestrator.
//!
//! A run walks the remote library sequentially and hands each item to the
//! materializer:
//!
//! - **initial**: every titled album into its own container, then the flat
//!   library into the root container, skipping items an album already saved
//! - **incremental**: a date-bounded search since the last watermark, all
//!   results into the root container
//!
//! Listing failures at the top level end the run; per-album and per-item
//! failures are counted and the run continues. The global download ceiling
//! is checked before every materialization.

pub mod error;
pub mod result;

use std::collections::HashSet;
use std::io::IsTerminal;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info, warn};

use crate::download::paths::{ensure_container, sanitize_album_title};
use crate::download::{MaterializeOutcome, Materializer};
use crate::fetch::{fetch_album_items, fetch_albums, fetch_library, search_created_between};
use crate::library::{Album, MediaItem, MediaLibrary};
use crate::state::StatusTracker;
use crate::types::SyncMode;

pub use error::SyncError;
pub use result::{RunLimits, RunResult};

#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Root local container; album containers are created beneath it.
    pub root: PathBuf,
    pub limits: RunLimits,
    pub no_progress_bar: bool,
}

/// Drives one run at a time against borrowed collaborators.
pub struct SyncEngine<'a> {
    library: &'a dyn MediaLibrary,
    materializer: &'a dyn Materializer,
    tracker: &'a mut StatusTracker,
    settings: SyncSettings,
    progress: ProgressBar,
}

/// Returns `ProgressBar::hidden()` when the user passed `--no-progress-bar` or
/// stdout is not a TTY. The length grows as listings come in.
fn create_progress_bar(no_progress_bar: bool) -> ProgressBar {
    if no_progress_bar || !std::io::stdout().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template(
        "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
    ) {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        library: &'a dyn MediaLibrary,
        materializer: &'a dyn Materializer,
        tracker: &'a mut StatusTracker,
        settings: SyncSettings,
    ) -> Self {
        Self {
            library,
            materializer,
            tracker,
            settings,
            progress: ProgressBar::hidden(),
        }
    }

    /// Full sync: albums first, then the flat library minus anything an
    /// album already saved.
    pub async fn run_initial(&mut self) -> RunResult {
        info!("Starting initial sync into {}", self.settings.root.display());
        self.tracker.start_run(SyncMode::Initial, 0, None);
        self.progress = create_progress_bar(self.settings.no_progress_bar);

        let mut result = RunResult::new(SyncMode::Initial);
        let outcome = self.initial_pass(&mut result).await;
        self.finish(result, outcome)
    }

    /// Sync items created in `(since, until]` into the root container.
    pub async fn run_incremental(
        &mut self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> RunResult {
        info!(
            "Starting incremental sync of items created after {} into {}",
            since,
            self.settings.root.display()
        );
        self.tracker
            .start_run(SyncMode::Incremental, 0, Some(since));
        self.progress = create_progress_bar(self.settings.no_progress_bar);

        let mut result = RunResult::new(SyncMode::Incremental);
        let outcome = self.incremental_pass(since, until, &mut result).await;
        self.finish(result, outcome)
    }

    async fn initial_pass(&mut self, result: &mut RunResult) -> Result<(), SyncError> {
        let root = self.settings.root.clone();
        let max_pages = self.settings.limits.max_pages;
        self.ensure_root(&root).await?;

        let albums = fetch_albums(self.library, max_pages)
            .await
            .map_err(SyncError::listing("albums"))?;
        result.page_limit_reached |= albums.truncated;
        info!(
            "Found {} albums in {} pages",
            albums.items.len(),
            albums.pages
        );

        let mut downloaded_ids: HashSet<String> = HashSet::new();
        for album in &albums.items {
            if self.check_ceiling(result) {
                break;
            }
            if album.title.is_empty() {
                self.progress
                    .suspend(|| warn!(album_id = %album.id, "Skipping album without a title"));
                continue;
            }
            if self
                .sync_album(album, result, &mut downloaded_ids)
                .await
                .is_break()
            {
                break;
            }
        }

        if self.check_ceiling(result) {
            self.progress
                .suspend(|| info!("Download limit reached; skipping the library listing"));
            return Ok(());
        }

        let library = fetch_library(self.library, max_pages)
            .await
            .map_err(SyncError::listing("library"))?;
        result.page_limit_reached |= library.truncated;

        let listed = library.items.len();
        let remaining: Vec<MediaItem> = library
            .items
            .into_iter()
            .filter(|item| !downloaded_ids.contains(&item.id))
            .collect();
        self.progress.suspend(|| {
            info!(
                "Library lists {} items, {} not already saved from albums",
                listed,
                remaining.len()
            )
        });
        self.expect_more(remaining.len());

        for item in &remaining {
            if self.process_item(item, &root, result).await.is_break() {
                break;
            }
        }
        Ok(())
    }

    /// Sync one album into its own container. Breaks when the download
    /// ceiling stops the run.
    async fn sync_album(
        &mut self,
        album: &Album,
        result: &mut RunResult,
        downloaded_ids: &mut HashSet<String>,
    ) -> ControlFlow<()> {
        let container = self
            .settings
            .root
            .join(sanitize_album_title(&album.title));

        if let Err(e) = ensure_container(&container).await {
            self.progress.suspend(|| {
                warn!(
                    "Skipping album '{}': could not create {}: {}",
                    album.title,
                    container.display(),
                    e
                )
            });
            result.albums_skipped += 1;
            return ControlFlow::Continue(());
        }

        let items = match fetch_album_items(self.library, album, self.settings.limits.max_pages).await
        {
            Ok(items) => items,
            Err(e) => {
                self.progress
                    .suspend(|| warn!("Skipping album '{}': {}", album.title, e));
                result.albums_skipped += 1;
                return ControlFlow::Continue(());
            }
        };
        result.page_limit_reached |= items.truncated;
        result.albums_processed += 1;
        self.progress.suspend(|| {
            debug!(
                album = %album.title,
                container = %container.display(),
                count = items.items.len(),
                reported = album.media_items_count.as_deref().unwrap_or("?"),
                "Syncing album"
            )
        });
        self.expect_more(items.items.len());

        for item in &items.items {
            match self.process_item(item, &container, result).await {
                ControlFlow::Break(()) => return ControlFlow::Break(()),
                ControlFlow::Continue(true) => {
                    downloaded_ids.insert(item.id.clone());
                }
                ControlFlow::Continue(false) => {}
            }
        }
        ControlFlow::Continue(())
    }

    async fn incremental_pass(
        &mut self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
        result: &mut RunResult,
    ) -> Result<(), SyncError> {
        let root = self.settings.root.clone();
        self.ensure_root(&root).await?;

        if since >= until {
            warn!(
                "Last sync time {} is not before {}; nothing to search for",
                since, until
            );
            return Ok(());
        }

        let found = search_created_between(self.library, since, until, self.settings.limits.max_pages)
            .await
            .map_err(SyncError::listing("date search"))?;
        result.page_limit_reached |= found.truncated;
        info!("Found {} new items", found.items.len());
        self.expect_more(found.items.len());

        for item in &found.items {
            if self.process_item(item, &root, result).await.is_break() {
                break;
            }
        }
        Ok(())
    }

    /// Materialize one item unless the download ceiling has been reached.
    ///
    /// Continues with whether the item is now on disk.
    async fn process_item(
        &mut self,
        item: &MediaItem,
        container: &Path,
        result: &mut RunResult,
    ) -> ControlFlow<(), bool> {
        if self.check_ceiling(result) {
            return ControlFlow::Break(());
        }

        result.items_processed += 1;
        self.progress.set_message(item.filename.clone());

        let saved = match self.materializer.materialize(item, container).await {
            Ok(MaterializeOutcome::Downloaded) => {
                result.items_downloaded += 1;
                true
            }
            Ok(MaterializeOutcome::AlreadyPresent) => {
                result.items_downloaded += 1;
                result.items_already_present += 1;
                true
            }
            Ok(MaterializeOutcome::Failed) => {
                result.items_failed += 1;
                false
            }
            Err(e) => {
                self.progress
                    .suspend(|| warn!(id = %item.id, "Could not save {}: {}", item.filename, e));
                result.items_failed += 1;
                false
            }
        };

        self.tracker.record_completion();
        self.progress.inc(1);
        ControlFlow::Continue(saved)
    }

    /// Whether the download ceiling blocks the pending work. Only called
    /// when there is something left to do, so a set flag means the run was
    /// cut short. Logs the first time.
    fn check_ceiling(&self, result: &mut RunResult) -> bool {
        let limits = self.settings.limits;
        if !limits.download_ceiling_reached(result.items_downloaded) {
            return false;
        }
        if !result.download_limit_reached {
            result.download_limit_reached = true;
            self.progress.suspend(|| {
                info!(
                    "Reached download limit of {}; stopping",
                    limits.max_downloads
                )
            });
        }
        true
    }

    fn expect_more(&mut self, count: usize) {
        self.tracker
            .update_expected_total(i64::try_from(count).unwrap_or(i64::MAX));
        self.progress.inc_length(count as u64);
    }

    async fn ensure_root(&self, root: &Path) -> Result<(), SyncError> {
        ensure_container(root)
            .await
            .map_err(|source| SyncError::RootContainer {
                path: root.to_path_buf(),
                source,
            })
    }

    fn finish(&mut self, mut result: RunResult, outcome: Result<(), SyncError>) -> RunResult {
        self.progress.finish_and_clear();

        result.success = outcome.is_ok();
        result.summary = result.describe(&self.settings.limits, outcome.as_ref().err());

        info!("── Summary ──");
        match &outcome {
            Ok(()) => info!("  {}", result.summary),
            Err(e) => {
                error!("  {}", result.summary);
                if let SyncError::Listing { source, .. } = e {
                    if source.is_unauthorized() {
                        error!("  The access token was rejected; refresh it and run again");
                    }
                }
            }
        }

        self.tracker.end_run(result.success, &result.summary);
        result
    }
}
