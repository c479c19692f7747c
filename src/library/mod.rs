//! Remote listing primitives: the cursor-paginated album, library,
//! album-scoped and date-search listings the sync engine walks.

mod client;
pub mod error;
#[cfg(test)]
pub(crate) mod fake;
pub mod types;

pub use client::{PhotosLibraryClient, DEFAULT_API_BASE_URL};
pub use error::ApiError;
pub use types::{Album, DateFilter, MediaItem, Page};

/// Cursor-based listing surface of the remote library.
///
/// Each call returns one page. A `None` cursor requests the first page;
/// `Page::next_cursor == None` means the listing is exhausted.
#[async_trait::async_trait]
pub trait MediaLibrary: Send + Sync {
    async fn list_albums(
        &self,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<Album>, ApiError>;

    async fn list_media_items(
        &self,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<MediaItem>, ApiError>;

    async fn list_album_items(
        &self,
        album_id: &str,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<MediaItem>, ApiError>;

    async fn search_by_date(
        &self,
        filter: &DateFilter,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<MediaItem>, ApiError>;
}
