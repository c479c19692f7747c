use crate::types::SyncMode;

use super::error::SyncError;

/// Operator-supplied ceilings. Zero means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunLimits {
    /// Pages drawn from each individual listing.
    pub max_pages: u32,
    /// Successful materializations across the whole run.
    pub max_downloads: u64,
}

impl RunLimits {
    pub fn download_ceiling_reached(&self, downloaded: u64) -> bool {
        self.max_downloads > 0 && downloaded >= self.max_downloads
    }
}

/// Aggregate outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub mode: SyncMode,
    pub success: bool,
    pub albums_processed: u64,
    /// Albums skipped because their container or item listing failed.
    pub albums_skipped: u64,
    /// Items handed to the materializer.
    pub items_processed: u64,
    /// Successful materializations, including items already on disk.
    pub items_downloaded: u64,
    pub items_already_present: u64,
    pub items_failed: u64,
    pub download_limit_reached: bool,
    pub page_limit_reached: bool,
    pub summary: String,
}

impl RunResult {
    pub(crate) fn new(mode: SyncMode) -> Self {
        Self {
            mode,
            success: false,
            albums_processed: 0,
            albums_skipped: 0,
            items_processed: 0,
            items_downloaded: 0,
            items_already_present: 0,
            items_failed: 0,
            download_limit_reached: false,
            page_limit_reached: false,
            summary: String::new(),
        }
    }

    /// Human-readable summary of the run so far. `failure` is the error that
    /// ended the run, if any.
    pub(crate) fn describe(&self, limits: &RunLimits, failure: Option<&SyncError>) -> String {
        let mode = match self.mode {
            SyncMode::Initial => "Initial",
            SyncMode::Incremental => "Incremental",
        };
        let mut text = match failure {
            Some(e) => format!("{mode} sync failed: {e}. "),
            None => format!("{mode} sync complete: "),
        };

        if self.mode == SyncMode::Initial {
            text.push_str(&format!("{} albums, ", self.albums_processed));
        }
        text.push_str(&format!(
            "{} items processed, {} downloaded",
            self.items_processed, self.items_downloaded
        ));
        if self.items_already_present > 0 {
            text.push_str(&format!(" ({} already present)", self.items_already_present));
        }
        text.push_str(&format!(", {} failed", self.items_failed));

        if self.albums_skipped > 0 {
            text.push_str(&format!("; {} albums skipped after errors", self.albums_skipped));
        }
        if self.download_limit_reached {
            text.push_str(&format!(
                "; stopped at download limit of {}",
                limits.max_downloads
            ));
        }
        if self.page_limit_reached {
            text.push_str(&format!(
                "; page limit of {} truncated one or more listings",
                limits.max_pages
            ));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::ApiError;

    #[test]
    fn test_download_ceiling() {
        let unbounded = RunLimits::default();
        assert!(!unbounded.download_ceiling_reached(1_000_000));

        let limits = RunLimits {
            max_pages: 0,
            max_downloads: 2,
        };
        assert!(!limits.download_ceiling_reached(1));
        assert!(limits.download_ceiling_reached(2));
        assert!(limits.download_ceiling_reached(3));
    }

    #[test]
    fn test_describe_success() {
        let mut r = RunResult::new(SyncMode::Initial);
        r.albums_processed = 2;
        r.items_processed = 4;
        r.items_downloaded = 4;
        r.items_already_present = 1;
        let text = r.describe(&RunLimits::default(), None);
        assert_eq!(
            text,
            "Initial sync complete: 2 albums, 4 items processed, 4 downloaded (1 already present), 0 failed"
        );
    }

    #[test]
    fn test_describe_incremental_omits_albums() {
        let mut r = RunResult::new(SyncMode::Incremental);
        r.items_processed = 3;
        r.items_downloaded = 2;
        r.items_failed = 1;
        let text = r.describe(&RunLimits::default(), None);
        assert_eq!(
            text,
            "Incremental sync complete: 3 items processed, 2 downloaded, 1 failed"
        );
    }

    #[test]
    fn test_describe_ceiling_notes() {
        let limits = RunLimits {
            max_pages: 3,
            max_downloads: 5,
        };
        let mut r = RunResult::new(SyncMode::Initial);
        r.items_processed = 5;
        r.items_downloaded = 5;
        r.download_limit_reached = true;
        r.page_limit_reached = true;
        r.albums_skipped = 1;
        let text = r.describe(&limits, None);
        assert!(text.contains("1 albums skipped after errors"));
        assert!(text.contains("stopped at download limit of 5"));
        assert!(text.contains("page limit of 3"));
    }

    #[test]
    fn test_describe_failure() {
        let r = RunResult::new(SyncMode::Incremental);
        let err = SyncError::listing("date search")(ApiError::InvalidResponse("bad".into()));
        let text = r.describe(&RunLimits::default(), Some(&err));
        assert!(text.starts_with("Incremental sync failed: Listing date search failed"));
        assert!(text.contains("0 items processed"));
    }
}
