//! photo-sync: mirror a remote, paginated photo library into a local
//! directory.
//!
//! The first run walks every album and then the flat library; later runs
//! search only for items created since the last successful sync. Run
//! progress is published to a JSON status file for external monitors.

#![warn(clippy::all)]

mod auth;
mod cli;
mod config;
mod download;
mod fetch;
mod library;
mod lock;
mod state;
mod sync;
mod types;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use reqwest::Client;
use tracing_subscriber::EnvFilter;

use cli::{Command, SyncArgs};
use config::{Config, DataPaths};
use download::HttpMaterializer;
use library::PhotosLibraryClient;
use lock::RunLock;
use state::{StatusTracker, SyncState, SyncStateStore};
use sync::{SyncEngine, SyncSettings};

/// Run the status command.
fn run_status(paths: &DataPaths) -> anyhow::Result<()> {
    let status_path = paths.status_file();
    let Some(status) = StatusTracker::read(&status_path)? else {
        println!("No status file found at {}", status_path.display());
        println!("Run a sync first to create it.");
        return Ok(());
    };

    println!("Status file: {}", status_path.display());
    println!();
    match status.pid {
        Some(pid) => println!("State:     {} (pid {})", status.state, pid),
        None => println!("State:     {}", status.state),
    }
    if let Some(started) = &status.started_at {
        println!(
            "Started:   {}",
            started.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    println!(
        "Progress:  {}/{} items",
        status.completed_items, status.total_items
    );
    if let Some(updated) = &status.updated_at {
        println!(
            "Updated:   {}",
            updated.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    if let Some(summary) = &status.last_run_summary {
        println!();
        println!("Last run:  {}", summary);
    }

    let state = SyncStateStore::new(paths.state_file()).load();
    println!();
    match state.last_sync_timestamp {
        Some(ts) => println!("Last successful sync: {}", ts.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("Last successful sync: never (next run is a full sync)"),
    }
    Ok(())
}

/// Run the reset-state command.
fn run_reset_state(paths: &DataPaths, yes: bool) -> anyhow::Result<()> {
    let store = SyncStateStore::new(paths.state_file());

    if !store.path().exists() {
        println!("No sync state found at {}", store.path().display());
        return Ok(());
    }

    if !yes {
        println!("This will delete the sync state at:");
        println!("  {}", store.path().display());
        println!("The next run will re-scan the whole library.");
        println!();
        print!("Are you sure? [y/N] ");
        use std::io::Write;
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if store.reset()? {
        println!("Sync state deleted.");
    }
    Ok(())
}

/// Run the sync command: one initial or incremental run under the run lock.
async fn run_sync(args: SyncArgs, data_dir: &str) -> anyhow::Result<()> {
    let config = Config::from_cli(args, data_dir)?;
    tracing::debug!(?config, "Loaded configuration");

    let lock = RunLock::acquire(&config.data.lock_file()).await?;
    tracing::debug!("Holding run lock {}", lock.path().display());

    let mut tracker = StatusTracker::init(&config.data.status_file());
    let store = SyncStateStore::new(config.data.state_file());
    let state = store.load();

    let auth_client = Client::builder().timeout(config.timeout).build()?;
    let token =
        auth::resolve_access_token(&auth_client, &config.credentials, &config.token_url).await?;

    let remote = PhotosLibraryClient::new(&config.api_base_url, token, config.timeout)?;
    // Large videos can take longer than the request timeout, so downloads
    // only bound the connect phase.
    let download_client = Client::builder().connect_timeout(config.timeout).build()?;
    let materializer = HttpMaterializer::new(download_client);

    let settings = SyncSettings {
        root: config.directory.clone(),
        limits: config.limits,
        no_progress_bar: config.no_progress_bar,
    };

    let run_started = Utc::now();
    let result = {
        let mut engine = SyncEngine::new(&remote, &materializer, &mut tracker, settings);
        match state.last_sync_timestamp {
            None => engine.run_initial().await,
            Some(since) => engine.run_incremental(since, run_started).await,
        }
    };

    if !result.success {
        anyhow::bail!("{}", result.summary);
    }

    if result.download_limit_reached || result.page_limit_reached {
        tracing::warn!(
            "This run was cut short by a limit; items it skipped are older than the new \
             sync time and will only be picked up by a full sync (photo-sync reset-state)"
        );
    }

    store
        .save(&SyncState {
            last_sync_timestamp: Some(run_started),
        })
        .context("Sync finished but the sync state could not be saved")?;
    tracker.record_watermark(run_started);
    tracing::info!("Saved sync time {}", run_started);

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter())),
        )
        .init();

    let data_dir = cli.data_dir.clone();
    let paths = DataPaths::new(&data_dir);
    match cli.into_command() {
        Command::Status => run_status(&paths),
        Command::ResetState { yes } => run_reset_state(&paths, yes),
        Command::Sync(args) => run_sync(args, &data_dir).await,
    }
}
