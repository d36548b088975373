//! Batch sync command.

use std::path::Path;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::sync::{BatchFile, RunDefaults, SyncOutcome, Syncer};

use super::{PREFIX, print_outcome};

/// Sync every playlist in a batch file, stopping at the first failure
pub fn cmd_batch(
    rt: &Runtime,
    config: &Config,
    file: &Path,
    api_key: Option<&str>,
) -> anyhow::Result<()> {
    let batch = BatchFile::load(file)?;
    let defaults = RunDefaults::default().merged(&batch.defaults);
    let syncer = Syncer::from_config(config, config.api_key(api_key))?;

    println!(
        "{PREFIX} Syncing {} playlist(s) from {}",
        batch.playlists.len(),
        file.display()
    );

    let outcomes = rt.block_on(syncer.run_all(&batch.playlists, &defaults))?;
    for (job, outcome) in &outcomes {
        print_outcome(job, outcome);
    }

    let synced = outcomes
        .iter()
        .filter(|(_, o)| matches!(o, SyncOutcome::Synced(_)))
        .count();
    println!(
        "{PREFIX} Done: {} synced, {} empty",
        synced,
        outcomes.len() - synced
    );
    Ok(())
}
