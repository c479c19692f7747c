//! Wire types for the Photos Library REST surface.
//!
//! Only the fields the sync engine consumes are modelled; everything else in
//! the payload is ignored by serde.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One page of a cursor-based listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        // An empty-string token means "no more pages" on this API.
        let next_cursor = next_cursor.filter(|c| !c.is_empty());
        Self { items, next_cursor }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub media_items_count: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    pub creation_time: DateTime<Utc>,
}

/// A remote item as listed by the API. Never mutated after listing.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    #[serde(default)]
    pub filename: String,
    pub base_url: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    pub media_metadata: MediaMetadata,
}

impl MediaItem {
    pub fn created_at(&self) -> DateTime<Utc> {
        self.media_metadata.creation_time
    }

    pub fn is_video(&self) -> bool {
        self.mime_type
            .as_deref()
            .is_some_and(|m| m.starts_with("video/"))
    }

    /// Fetchable content URL. Base URLs need a suffix selecting the original
    /// bytes: `=d` for images, `=dv` for videos.
    pub fn download_url(&self) -> String {
        if self.is_video() {
            format!("{}=dv", self.base_url)
        } else {
            format!("{}=d", self.base_url)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AlbumListResponse {
    #[serde(default)]
    pub albums: Vec<Album>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MediaItemListResponse {
    #[serde(default)]
    pub media_items: Vec<MediaItem>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Calendar day as the API's date filter expects it.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct FilterDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl From<NaiveDate> for FilterDate {
    fn from(d: NaiveDate) -> Self {
        Self {
            year: d.year(),
            month: d.month(),
            day: d.day(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: FilterDate,
    pub end_date: FilterDate,
}

/// Day-granularity filter; both ends inclusive on the server side.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DateFilter {
    pub ranges: Vec<DateRange>,
}

impl DateFilter {
    /// Single range covering every calendar day touched by `since..=until`,
    /// padded by a day on each side since the server may resolve days in
    /// the account's local time zone. Callers trim to the exact window.
    pub fn covering(since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        let start = since.date_naive();
        let end = until.date_naive();
        Self {
            ranges: vec![DateRange {
                start_date: start.pred_opt().unwrap_or(start).into(),
                end_date: end.succ_opt().unwrap_or(end).into(),
            }],
        }
    }
}
