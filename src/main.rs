//! Aperture Sync - keeps a gallery catalog in step with remote playlists.
//!
//! Fetches playlist membership, caches thumbnails locally and reconciles
//! the catalog so each tag owns exactly the items of its playlist.

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod reconciler;
pub mod source;
pub mod store;
pub mod sync;
#[cfg(test)]
pub mod test_utils;
pub mod thumbnail;

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> ExitCode {
    let args = cli::Cli::parse();

    // Initialize logging; stdout is reserved for run summaries
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("aperture_sync=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli::run_command(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            // No command specified
            let _ = cli::Cli::command().print_help();
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("[aperture-sync] {e:#}");
            ExitCode::FAILURE
        }
    }
}
