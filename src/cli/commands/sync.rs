//! Single playlist sync command.

use tokio::runtime::Runtime;

use crate::config::Config;
use crate::sync::{PlaylistSpec, RunDefaults, Syncer};

use super::print_outcome;

/// Sync one playlist using the built-in defaults for unset options
pub fn cmd_sync(
    rt: &Runtime,
    config: &Config,
    spec: &PlaylistSpec,
    api_key: Option<&str>,
) -> anyhow::Result<()> {
    let job = spec.resolve(&RunDefaults::default())?;
    let syncer = Syncer::from_config(config, config.api_key(api_key))?;

    let outcome = rt.block_on(syncer.run_one(&job))?;
    print_outcome(&job, &outcome);
    Ok(())
}
