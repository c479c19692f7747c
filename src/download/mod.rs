//! Item materializer. Persists one remote item into a local container,
//! skipping items already on disk and cleaning up after failed transfers.

pub mod error;
#[cfg(test)]
pub(crate) mod fake;
pub mod file;
pub mod paths;

use std::path::Path;

use reqwest::Client;

use crate::library::MediaItem;

pub use error::DownloadError;

/// Outcome of materializing a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterializeOutcome {
    Downloaded,
    AlreadyPresent,
    Failed,
}

/// Writes remote items to local storage.
///
/// Ordinary transfer failures are reported as [`MaterializeOutcome::Failed`];
/// `Err` is reserved for unexpected local faults.
#[async_trait::async_trait]
pub trait Materializer: Send + Sync {
    async fn materialize(
        &self,
        item: &MediaItem,
        container: &Path,
    ) -> Result<MaterializeOutcome, DownloadError>;
}

/// Materializer that streams item content over HTTP.
#[derive(Debug, Clone)]
pub struct HttpMaterializer {
    client: Client,
}

impl HttpMaterializer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Materializer for HttpMaterializer {
    async fn materialize(
        &self,
        item: &MediaItem,
        container: &Path,
    ) -> Result<MaterializeOutcome, DownloadError> {
        let target = paths::item_target_path(container, &item.filename, &item.id);

        if tokio::fs::try_exists(&target).await? {
            tracing::debug!(id = %item.id, path = %target.display(), "Already present, skipping");
            return Ok(MaterializeOutcome::AlreadyPresent);
        }

        paths::ensure_container(container).await?;

        match file::download_file(&self.client, &item.download_url(), &target).await {
            Ok(bytes) => {
                tracing::debug!(
                    id = %item.id,
                    size_bytes = bytes,
                    path = %target.display(),
                    "Downloaded"
                );
                let mtime_path = target.clone();
                let ts = item.created_at().timestamp();
                match tokio::task::spawn_blocking(move || file::set_file_mtime(&mtime_path, ts))
                    .await
                {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::warn!("Could not set mtime on {}: {}", target.display(), e)
                    }
                    Err(e) => tracing::warn!("mtime task panicked: {}", e),
                }
                Ok(MaterializeOutcome::Downloaded)
            }
            Err(e) if e.is_remote() => {
                tracing::warn!(id = %item.id, "Download failed: {}", e);
                Ok(MaterializeOutcome::Failed)
            }
            Err(e) => Err(e),
        }
    }
}
