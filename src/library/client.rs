use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use super::error::ApiError;
use super::types::{
    Album, AlbumListResponse, DateFilter, MediaItem, MediaItemListResponse, Page,
};
use super::MediaLibrary;

pub const DEFAULT_API_BASE_URL: &str = "https://photoslibrary.googleapis.com";

/// `MediaLibrary` over the Photos Library REST API with a bearer token.
pub struct PhotosLibraryClient {
    http: Client,
    base_url: String,
    access_token: String,
}

impl std::fmt::Debug for PhotosLibraryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotosLibraryClient")
            .field("base_url", &self.base_url)
            .field("access_token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl PhotosLibraryClient {
    pub fn new(base_url: &str, access_token: String, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.bearer_auth(&self.access_token).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let text = response.text().await?;
        if text.trim().is_empty() {
            return serde_json::from_str("{}").map_err(ApiError::from);
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn search(&self, body: Value) -> Result<Page<MediaItem>, ApiError> {
        debug!("mediaItems:search {}", body);
        let resp: MediaItemListResponse = self
            .send(self.http.post(self.endpoint("mediaItems:search")).json(&body))
            .await?;
        Ok(Page::new(resp.media_items, resp.next_page_token))
    }
}

/// Query parameters for the GET listings.
fn page_query(page_size: u32, cursor: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = vec![("pageSize", page_size.to_string())];
    if let Some(token) = cursor {
        query.push(("pageToken", token.to_string()));
    }
    query
}

/// Body for an album-scoped `mediaItems:search`.
fn album_search_body(album_id: &str, page_size: u32, cursor: Option<&str>) -> Value {
    let mut body = json!({ "albumId": album_id, "pageSize": page_size });
    if let Some(token) = cursor {
        body["pageToken"] = json!(token);
    }
    body
}

/// Body for a date-filtered `mediaItems:search`.
fn date_search_body(filter: &DateFilter, page_size: u32, cursor: Option<&str>) -> Value {
    let mut body = json!({
        "filters": { "dateFilter": filter },
        "pageSize": page_size,
    });
    if let Some(token) = cursor {
        body["pageToken"] = json!(token);
    }
    body
}

#[async_trait::async_trait]
impl MediaLibrary for PhotosLibraryClient {
    async fn list_albums(
        &self,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<Album>, ApiError> {
        let resp: AlbumListResponse = self
            .send(
                self.http
                    .get(self.endpoint("albums"))
                    .query(&page_query(page_size, cursor.as_deref())),
            )
            .await?;
        Ok(Page::new(resp.albums, resp.next_page_token))
    }

    async fn list_media_items(
        &self,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<MediaItem>, ApiError> {
        let resp: MediaItemListResponse = self
            .send(
                self.http
                    .get(self.endpoint("mediaItems"))
                    .query(&page_query(page_size, cursor.as_deref())),
            )
            .await?;
        Ok(Page::new(resp.media_items, resp.next_page_token))
    }

    async fn list_album_items(
        &self,
        album_id: &str,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<MediaItem>, ApiError> {
        self.search(album_search_body(album_id, page_size, cursor.as_deref()))
            .await
    }

    async fn search_by_date(
        &self,
        filter: &DateFilter,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<Page<MediaItem>, ApiError> {
        self.search(date_search_body(filter, page_size, cursor.as_deref()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_page_query_first_page() {
        let q = page_query(50, None);
        assert_eq!(q, vec![("pageSize", "50".to_string())]);
    }

    #[test]
    fn test_page_query_with_cursor() {
        let q = page_query(100, Some("abc"));
        assert_eq!(q.len(), 2);
        assert_eq!(q[1], ("pageToken", "abc".to_string()));
    }

    #[test]
    fn test_album_search_body() {
        let body = album_search_body("ALB", 100, Some("next"));
        assert_eq!(body["albumId"], "ALB");
        assert_eq!(body["pageSize"], 100);
        assert_eq!(body["pageToken"], "next");

        let body = album_search_body("ALB", 100, None);
        assert!(body.get("pageToken").is_none());
    }

    #[test]
    fn test_date_search_body() {
        let since = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2024, 5, 3, 8, 0, 0).unwrap();
        let body = date_search_body(&DateFilter::covering(since, until), 100, None);
        let range = &body["filters"]["dateFilter"]["ranges"][0];
        assert_eq!(range["startDate"]["month"], 4);
        assert_eq!(range["startDate"]["day"], 30);
        assert_eq!(range["endDate"]["day"], 4);
        assert!(body.get("albumId").is_none());
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = PhotosLibraryClient::new(
            "https://example.test/",
            "token".into(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.endpoint("albums"), "https://example.test/v1/albums");
        assert!(!format!("{:?}", client).contains("\"token\""));
    }
}
