//! In-memory `MediaLibrary` used by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};

use super::types::FilterDate;
use super::{Album, ApiError, DateFilter, MediaItem, MediaLibrary, Page};

pub(crate) fn item(id: &str, created: DateTime<Utc>) -> MediaItem {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "filename": format!("{id}.jpg"),
        "baseUrl": format!("https://media.test/{id}"),
        "mimeType": "image/jpeg",
        "mediaMetadata": {"creationTime": created.to_rfc3339()},
    }))
    .unwrap()
}

pub(crate) fn album(id: &str, title: &str) -> Album {
    Album {
        id: id.to_string(),
        title: title.to_string(),
        media_items_count: None,
    }
}

#[derive(Default)]
pub(crate) struct FakeLibrary {
    pub albums: Vec<Album>,
    pub album_items: HashMap<String, Vec<MediaItem>>,
    pub library: Vec<MediaItem>,
    /// Items served per page; 0 serves everything in one page.
    pub page_len: usize,
    pub fail_albums: bool,
    pub fail_library: bool,
    pub fail_search: bool,
    pub failing_album_ids: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeLibrary {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn paginate<T: Clone>(&self, all: &[T], cursor: Option<String>) -> Page<T> {
        let start: usize = cursor.and_then(|c| c.parse().ok()).unwrap_or(0);
        let len = if self.page_len == 0 {
            all.len().max(1)
        } else {
            self.page_len
        };
        let end = (start + len).min(all.len());
        let next = (end < all.len()).then(|| end.to_string());
        Page::new(all[start.min(end)..end].to_vec(), next)
    }
}

fn to_naive(d: &FilterDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(d.year, d.month, d.day).unwrap()
}

#[async_trait::async_trait]
impl MediaLibrary for FakeLibrary {
    async fn list_albums(
        &self,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<Album>, ApiError> {
        self.record(format!("albums:{page_size}"));
        if self.fail_albums {
            return Err(ApiError::InvalidResponse("albums unavailable".into()));
        }
        Ok(self.paginate(&self.albums, cursor))
    }

    async fn list_media_items(
        &self,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<MediaItem>, ApiError> {
        self.record(format!("library:{page_size}"));
        if self.fail_library {
            return Err(ApiError::InvalidResponse("library unavailable".into()));
        }
        Ok(self.paginate(&self.library, cursor))
    }

    async fn list_album_items(
        &self,
        album_id: &str,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<MediaItem>, ApiError> {
        self.record(format!("album_items:{album_id}:{page_size}"));
        if self.failing_album_ids.contains(album_id) {
            return Err(ApiError::Status {
                status: 500,
                body: format!("album {album_id} broken"),
            });
        }
        let items = self.album_items.get(album_id).cloned().unwrap_or_default();
        Ok(self.paginate(&items, cursor))
    }

    /// Day-granularity match like the real server: both range ends inclusive.
    async fn search_by_date(
        &self,
        filter: &DateFilter,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<MediaItem>, ApiError> {
        self.record(format!("search:{page_size}"));
        if self.fail_search {
            return Err(ApiError::InvalidResponse("search unavailable".into()));
        }
        let matching: Vec<MediaItem> = self
            .library
            .iter()
            .filter(|i| {
                let day = i.created_at().date_naive();
                filter
                    .ranges
                    .iter()
                    .any(|r| day >= to_naive(&r.start_date) && day <= to_naive(&r.end_date))
            })
            .cloned()
            .collect();
        Ok(self.paginate(&matching, cursor))
    }
}
