use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::Credentials;
use crate::cli::SyncArgs;
use crate::sync::RunLimits;

/// Locations of the sidecar files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    dir: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: &str) -> Self {
        Self {
            dir: expand_tilde(data_dir),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn status_file(&self) -> PathBuf {
        self.dir.join("status.json")
    }

    pub fn state_file(&self) -> PathBuf {
        self.dir.join("sync_state.json")
    }

    pub fn lock_file(&self) -> PathBuf {
        self.dir.join("sync.lock")
    }
}

/// Everything a sync run needs, with defaults already applied.
pub struct Config {
    pub directory: PathBuf,
    pub data: DataPaths,
    pub credentials: Credentials,
    pub api_base_url: String,
    pub token_url: String,
    pub timeout: Duration,
    pub limits: RunLimits,
    pub no_progress_bar: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("directory", &self.directory)
            .field("data_dir", &self.data.dir())
            .field("credentials", &self.credentials)
            .field("api_base_url", &self.api_base_url)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Config {
    pub fn from_cli(args: SyncArgs, data_dir: &str) -> anyhow::Result<Self> {
        if !(args.api_base_url.starts_with("https://") || args.api_base_url.starts_with("http://"))
        {
            anyhow::bail!(
                "--api-base-url must be an http(s) URL, got '{}'",
                args.api_base_url
            );
        }
        if args.timeout_secs == 0 {
            anyhow::bail!("--timeout-secs must be greater than zero");
        }

        Ok(Self {
            directory: expand_tilde(&args.directory),
            data: DataPaths::new(data_dir),
            credentials: Credentials {
                access_token: args.access_token,
                client_id: args.client_id,
                client_secret: args.client_secret,
                refresh_token: args.refresh_token,
            },
            api_base_url: args.api_base_url,
            token_url: args.token_url,
            timeout: Duration::from_secs(args.timeout_secs),
            limits: RunLimits {
                max_pages: args.max_pages,
                max_downloads: args.max_downloads,
            },
            no_progress_bar: args.no_progress_bar,
        })
    }
}
