//! Recording `Materializer` used by unit tests.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{DownloadError, MaterializeOutcome, Materializer};
use crate::library::MediaItem;

#[derive(Default)]
pub(crate) struct FakeMaterializer {
    /// Items whose materialization reports `Failed`.
    pub failing: HashSet<String>,
    /// Items whose materialization returns an `Err`.
    pub erroring: HashSet<String>,
    /// Items reported as already on disk.
    pub present: HashSet<String>,
    pub calls: Mutex<Vec<(String, PathBuf)>>,
}

impl FakeMaterializer {
    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn ids(&self) -> Vec<String> {
        self.calls().into_iter().map(|(id, _)| id).collect()
    }
}

#[async_trait::async_trait]
impl Materializer for FakeMaterializer {
    async fn materialize(
        &self,
        item: &MediaItem,
        container: &Path,
    ) -> Result<MaterializeOutcome, DownloadError> {
        self.calls
            .lock()
            .unwrap()
            .push((item.id.clone(), container.to_path_buf()));
        if self.erroring.contains(&item.id) {
            return Err(DownloadError::Disk(std::io::Error::other("disk fault")));
        }
        if self.failing.contains(&item.id) {
            return Ok(MaterializeOutcome::Failed);
        }
        if self.present.contains(&item.id) {
            return Ok(MaterializeOutcome::AlreadyPresent);
        }
        Ok(MaterializeOutcome::Downloaded)
    }
}
