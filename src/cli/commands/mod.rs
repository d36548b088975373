//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `sync`: one playlist into one catalog
//! - `batch`: every playlist of a batch file
//! - `filters`: filter list maintenance without fetching

mod batch;
mod filters;
mod sync;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

pub use batch::cmd_batch;
pub use filters::cmd_filters;
pub use sync::cmd_sync;

use crate::config;
use crate::store::StoreMode;
use crate::sync::{PlaylistSpec, SyncJob, SyncOutcome};

/// Prefix for user-facing output
pub(crate) const PREFIX: &str = "[aperture-sync]";

/// Aperture Sync CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: <config dir>/aperture-sync/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Sync one playlist into the catalog
    Sync {
        /// Playlist URL or id
        #[arg(short, long)]
        playlist: String,
        /// Tag that owns the synced entries
        #[arg(short, long)]
        tag: String,
        /// Maximum number of items to fetch (0 = all)
        #[arg(short, long)]
        max: Option<usize>,
        /// Thumbnail directory (default: public/media/yt)
        #[arg(short, long, alias = "outDir")]
        out_dir: Option<PathBuf>,
        /// Catalog file (default: src/content/items.json)
        #[arg(long)]
        target: Option<PathBuf>,
        /// How the catalog may be edited
        #[arg(long, value_enum)]
        mode: Option<StoreMode>,
        /// Re-download thumbnails even if cached
        #[arg(short, long)]
        force: bool,
        /// Same as --force
        #[arg(long, alias = "forceUpdate")]
        force_update: bool,
        /// YouTube Data API key (or set YOUTUBE_API_KEY env var)
        #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
    /// Sync every playlist listed in a batch file
    Batch {
        /// Path to the batch TOML file
        file: PathBuf,
        /// YouTube Data API key (or set YOUTUBE_API_KEY env var)
        #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
    /// Make sure a filter label exists in the catalog
    Filters {
        /// Catalog file (default: src/content/items.json)
        #[arg(long)]
        target: Option<PathBuf>,
        /// Filter label to add
        #[arg(short, long)]
        tag: String,
    },
}

/// Run a CLI command. Returns `Ok(false)` if no command was given.
pub fn run_command(cli: &Cli) -> anyhow::Result<bool> {
    let Some(command) = &cli.command else {
        return Ok(false);
    };

    let config = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => config::load(),
    };

    match command {
        Commands::Sync {
            playlist,
            tag,
            max,
            out_dir,
            target,
            mode,
            force,
            force_update,
            api_key,
        } => {
            let spec = PlaylistSpec {
                tag: tag.clone(),
                playlist: playlist.clone(),
                out_dir: out_dir.clone(),
                target: target.clone(),
                mode: *mode,
                max: *max,
                force_update: Some(*force || *force_update),
            };
            let rt = Runtime::new()?;
            cmd_sync(&rt, &config, &spec, api_key.as_deref())?;
        }
        Commands::Batch { file, api_key } => {
            let rt = Runtime::new()?;
            cmd_batch(&rt, &config, file, api_key.as_deref())?;
        }
        Commands::Filters { target, tag } => {
            cmd_filters(&config, target.as_deref(), tag)?;
        }
    }
    Ok(true)
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Print the result line for one playlist
pub(crate) fn print_outcome(job: &SyncJob, outcome: &SyncOutcome) {
    match outcome {
        SyncOutcome::NothingToSync => {
            println!("{PREFIX} No items found for '{}'. Nothing to sync.", job.tag)
        }
        SyncOutcome::Synced(report) => {
            println!("{PREFIX} '{}' -> {}", job.tag, job.target.display());
            println!("{PREFIX} {report}");
        }
    }
}
