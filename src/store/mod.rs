//! Catalog persistence.
//!
//! The reconciler talks to the catalog through [`CatalogStore`]. Two
//! backends share one JSON document model:
//!
//! - [`AppendOnlyStore`] - only inserts unseen ids; creates the file and
//!   collection when missing
//! - [`ReconcileStore`] - full edits (update, retire, delete, insert) plus
//!   filter maintenance; the file and collection must already exist
//!
//! Every edit is held in memory until [`CatalogStore::commit`], which
//! replaces the file atomically.

mod append;
mod document;
mod reconcile;

pub use append::AppendOnlyStore;
pub use document::{ALL_FILTER, CatalogDocument, CatalogLayout, FilterUpdate};
pub use reconcile::ReconcileStore;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::CatalogEntry;

/// How a sync may edit the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    /// Insert unseen items only
    #[default]
    #[serde(alias = "append-only")]
    #[value(alias = "append-only")]
    Append,
    /// Update, retire, delete and insert managed items
    Reconcile,
}

impl StoreMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreMode::Append => "append",
            StoreMode::Reconcile => "reconcile",
        }
    }
}

impl std::fmt::Display for StoreMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from catalog storage
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Catalog not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse {0}: {1}")]
    Parse(PathBuf, String),

    #[error("Catalog root is not an object: {0}")]
    NotAnObject(PathBuf),

    #[error("Collection '{1}' not found in {0}")]
    MissingCollection(PathBuf, String),

    #[error("Collection '{1}' in {0} is not an array")]
    NotACollection(PathBuf, String),

    #[error("No catalog entry with id '{0}'")]
    UnknownEntry(String),

    #[error("The append-only store does not support {0}")]
    AppendOnly(&'static str),

    #[error("Failed to serialize catalog: {0}")]
    Serialize(String),

    #[error("Failed to write {0}: {1}")]
    Write(PathBuf, #[source] std::io::Error),
}

/// Catalog operations the reconciler needs.
pub trait CatalogStore {
    /// Which edits this store supports
    fn mode(&self) -> StoreMode;

    /// Every entry whose tag set contains `tag`, in document order.
    ///
    /// Returned entries carry their position, so edits land on the same
    /// element even when another tag holds an entry with the same id.
    fn list_managed_entries(&self, tag: &str) -> Vec<CatalogEntry>;

    /// Whether any entry has exactly this id
    fn contains(&self, id: &str) -> bool;

    /// Write back an entry read from this store, or append one that has no position.
    fn upsert(&mut self, entry: &CatalogEntry) -> Result<(), StoreError>;

    /// Remove an entry read from this store.
    fn delete(&mut self, entry: &CatalogEntry) -> Result<(), StoreError>;

    /// Append a new entry.
    fn insert(&mut self, entry: &CatalogEntry) -> Result<(), StoreError>;

    /// Make sure the filter list offers `label`. Stores without filters ignore this.
    fn ensure_filter_present(&mut self, label: &str) -> Result<(), StoreError>;

    /// Persist pending edits. Returns whether the file was written.
    fn commit(&mut self) -> Result<bool, StoreError>;
}

/// Open the catalog at `path` with the backend for `mode`.
pub fn open_store(
    mode: StoreMode,
    path: &Path,
    layout: CatalogLayout,
) -> Result<Box<dyn CatalogStore>, StoreError> {
    Ok(match mode {
        StoreMode::Append => Box::new(AppendOnlyStore::open(path, layout)?),
        StoreMode::Reconcile => Box::new(ReconcileStore::open(path, layout)?),
    })
}

fn managed_entries(document: &CatalogDocument, tag: &str) -> Vec<CatalogEntry> {
    document
        .entries()
        .into_iter()
        .filter(|e| e.is_managed_by(tag))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{entry, image_entry, write_catalog};
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_store_mode_parses_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: StoreMode,
        }
        let w: Wrapper = toml::from_str("mode = \"reconcile\"").unwrap();
        assert_eq!(w.mode, StoreMode::Reconcile);
        let w: Wrapper = toml::from_str("mode = \"append-only\"").unwrap();
        assert_eq!(w.mode, StoreMode::Append);
    }

    #[test]
    fn test_managed_entries_by_tag_with_positions() {
        let temp = TempDir::new().unwrap();
        let mut dup = entry("v1", &["music"]);
        dup["alt"] = json!("duplicate");
        let path = write_catalog(
            temp.path(),
            &json!({ "items": [
                entry("v1", &["live"]),
                entry("v1", &["music"]),
                image_entry("cat-1", &["music"]),
                dup,
            ] }),
        );
        let doc = CatalogDocument::load(path, CatalogLayout::default()).unwrap();

        let managed = managed_entries(&doc, "music");
        let found: Vec<_> = managed
            .iter()
            .map(|e| (e.id.as_str(), e.position))
            .collect();
        assert_eq!(
            found,
            [("yt:v1", Some(1)), ("cat-1", Some(2)), ("yt:v1", Some(3))]
        );
        assert_eq!(managed[2].label, "duplicate");
    }

    #[test]
    fn test_open_store_selects_backend() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("new.json");

        let store = open_store(StoreMode::Append, &path, CatalogLayout::default()).unwrap();
        assert_eq!(store.mode(), StoreMode::Append);

        let err = open_store(StoreMode::Reconcile, &path, CatalogLayout::default());
        assert!(matches!(err, Err(StoreError::NotFound(_))));
    }
}
