use clap::{Args, Parser, Subcommand};

use crate::auth::DEFAULT_TOKEN_URL;
use crate::library::DEFAULT_API_BASE_URL;
use crate::types::LogLevel;

#[derive(Parser, Debug)]
#[command(
    name = "photo-sync",
    version,
    about = "Mirror a remote photo library into a local directory",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options for the default `sync` command
    #[command(flatten)]
    pub sync: SyncArgs,

    /// Directory for the status, sync-state and lock files
    #[arg(long, global = true, env = "PHOTO_SYNC_DATA_DIR", default_value = "~/.photo-sync")]
    pub data_dir: String,

    /// Log level
    #[arg(long, global = true, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sync the library (the default when no command is given)
    Sync(SyncArgs),

    /// Show the status of the current or most recent run
    Status,

    /// Forget the last sync time so the next run is a full sync
    ResetState {
        /// Don't ask for confirmation
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    /// Local directory the library is mirrored into
    #[arg(
        short = 'd',
        long,
        env = "PHOTO_SYNC_DIRECTORY",
        default_value = "~/Pictures/photo-sync"
    )]
    pub directory: String,

    /// OAuth access token. Takes precedence over the refresh-token options.
    #[arg(long, env = "PHOTO_SYNC_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// OAuth client id used to refresh the access token
    #[arg(long, env = "PHOTO_SYNC_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth client secret used to refresh the access token
    #[arg(long, env = "PHOTO_SYNC_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// OAuth refresh token
    #[arg(long, env = "PHOTO_SYNC_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,

    /// Base URL of the library API
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// OAuth token endpoint
    #[arg(long, default_value = DEFAULT_TOKEN_URL, hide = true)]
    pub token_url: String,

    /// Stop each listing after this many pages (0 = no limit)
    #[arg(long, default_value_t = 0)]
    pub max_pages: u32,

    /// Stop the run after this many successful downloads (0 = no limit)
    #[arg(long, default_value_t = 0)]
    pub max_downloads: u64,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Disable progress bar
    #[arg(long)]
    pub no_progress_bar: bool,
}

impl Cli {
    /// The command to run; bare invocation means `sync`.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Sync(self.sync))
    }
}
