//! Command-line interface for aperture-sync.
//!
//! This module provides CLI commands for syncing playlists into a gallery
//! catalog, one at a time or from a batch file.

mod commands;

pub use commands::{Cli, Commands, run_command};
