//! Filter list maintenance command.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Error;
use crate::store::{CatalogDocument, FilterUpdate};
use crate::sync::DEFAULT_TARGET;

use super::PREFIX;

/// Add `tag` to the catalog's filter list if it is missing
pub fn cmd_filters(config: &Config, target: Option<&Path>, tag: &str) -> anyhow::Result<()> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(Error::missing("tag").into());
    }

    let target = target.map_or_else(|| PathBuf::from(DEFAULT_TARGET), Path::to_path_buf);
    let mut document = CatalogDocument::load(&target, config.catalog.layout())?;

    match document.ensure_filter(tag) {
        FilterUpdate::Updated => {
            document.save()?;
            println!("{PREFIX} Added filter '{tag}' to {}", target.display());
        }
        FilterUpdate::Unchanged => {
            println!("{PREFIX} Filter '{tag}' already present");
        }
        FilterUpdate::NoConfig => {
            anyhow::bail!(
                "{} has no '{}' object to hold filters",
                target.display(),
                config.catalog.config_object
            );
        }
    }
    Ok(())
}
