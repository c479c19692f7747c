//! Paginated collection fetcher.
//!
//! Walks a cursor-based listing into a single in-memory collection,
//! optionally stopping after a fixed number of pages. The incremental search
//! additionally applies a precise client-side filter on top of the server's
//! day-granularity date filter.

use std::future::Future;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::library::{Album, ApiError, DateFilter, MediaItem, MediaLibrary, Page};

/// Page size for album listings.
pub const ALBUM_PAGE_SIZE: u32 = 50;

/// Page size for flat-library, album-item and search listings.
pub const ITEM_PAGE_SIZE: u32 = 100;

/// Result of walking one listing.
#[derive(Debug)]
pub struct Collected<T> {
    pub items: Vec<T>,
    pub pages: u32,
    /// True when the page ceiling stopped the walk while a cursor remained.
    pub truncated: bool,
}

/// Repeatedly invoke `fetch_page` until the listing has no continuation
/// cursor, or until `max_pages` pages have been drawn when `max_pages > 0`.
///
/// An empty page that still carries a cursor does not end the walk.
pub async fn collect_pages<T, F, Fut>(
    label: &str,
    page_size: u32,
    max_pages: u32,
    mut fetch_page: F,
) -> Result<Collected<T>, ApiError>
where
    F: FnMut(u32, Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, ApiError>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages: u32 = 0;

    loop {
        let sent = cursor.take();
        let page = fetch_page(page_size, sent.clone()).await?;
        pages += 1;
        debug!(
            listing = label,
            page = pages,
            count = page.items.len(),
            "Fetched page"
        );
        items.extend(page.items);

        let Some(next) = page.next_cursor else {
            return Ok(Collected {
                items,
                pages,
                truncated: false,
            });
        };

        if sent.as_deref() == Some(next.as_str()) {
            return Err(ApiError::InvalidResponse(format!(
                "{label}: page token did not advance after page {pages}"
            )));
        }

        if max_pages > 0 && pages >= max_pages {
            warn!(
                "{}: stopping after {} page(s) because of the page limit; more results remain",
                label, pages
            );
            return Ok(Collected {
                items,
                pages,
                truncated: true,
            });
        }
        cursor = Some(next);
    }
}

pub async fn fetch_albums(
    library: &dyn MediaLibrary,
    max_pages: u32,
) -> Result<Collected<Album>, ApiError> {
    collect_pages("albums", ALBUM_PAGE_SIZE, max_pages, |size, cursor| {
        library.list_albums(size, cursor)
    })
    .await
}

pub async fn fetch_library(
    library: &dyn MediaLibrary,
    max_pages: u32,
) -> Result<Collected<MediaItem>, ApiError> {
    collect_pages("library", ITEM_PAGE_SIZE, max_pages, |size, cursor| {
        library.list_media_items(size, cursor)
    })
    .await
}

pub async fn fetch_album_items(
    library: &dyn MediaLibrary,
    album: &Album,
    max_pages: u32,
) -> Result<Collected<MediaItem>, ApiError> {
    let label = format!("album '{}'", album.title);
    collect_pages(&label, ITEM_PAGE_SIZE, max_pages, |size, cursor| {
        library.list_album_items(&album.id, size, cursor)
    })
    .await
}

/// Whether `created` lies in the half-open window `(since, until]`.
///
/// An item created exactly at `since` was covered by the previous run; one
/// created exactly at `until` belongs to this run.
pub fn created_in_window(created: DateTime<Utc>, since: DateTime<Utc>, until: DateTime<Utc>) -> bool {
    created > since && created <= until
}

/// Items created in `(since, until]`, searched by day on the server and
/// trimmed to the exact window locally.
pub async fn search_created_between(
    library: &dyn MediaLibrary,
    since: DateTime<Utc>,
    until: DateTime<Utc>,
    max_pages: u32,
) -> Result<Collected<MediaItem>, ApiError> {
    let filter = DateFilter::covering(since, until);
    let mut collected = collect_pages("date search", ITEM_PAGE_SIZE, max_pages, |size, cursor| {
        library.search_by_date(&filter, size, cursor)
    })
    .await?;

    let before = collected.items.len();
    collected
        .items
        .retain(|item| created_in_window(item.created_at(), since, until));
    if collected.items.len() != before {
        debug!(
            dropped = before - collected.items.len(),
            "Dropped search results outside the exact sync window"
        );
    }
    Ok(collected)
}
