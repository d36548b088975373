use std::path::Path;

use tracing::{debug, warn};

use super::{
    CatalogDocument, CatalogLayout, CatalogStore, FilterUpdate, StoreError, StoreMode,
    managed_entries,
};
use crate::model::CatalogEntry;

/// Store with full edit rights over an existing catalog.
#[derive(Debug)]
pub struct ReconcileStore {
    document: CatalogDocument,
}

impl ReconcileStore {
    /// Open an existing catalog. The file and its collection must both exist.
    pub fn open(path: &Path, layout: CatalogLayout) -> Result<Self, StoreError> {
        let document = CatalogDocument::load(path, layout)?;
        document.require_collection()?;
        Ok(Self { document })
    }
}

impl CatalogStore for ReconcileStore {
    fn mode(&self) -> StoreMode {
        StoreMode::Reconcile
    }

    fn list_managed_entries(&self, tag: &str) -> Vec<CatalogEntry> {
        managed_entries(&self.document, tag)
    }

    fn contains(&self, id: &str) -> bool {
        self.document.contains_id(id)
    }

    fn upsert(&mut self, entry: &CatalogEntry) -> Result<(), StoreError> {
        if entry.position.is_none() {
            return self.document.push_entry(entry);
        }
        if self.document.patch_entry(entry)? {
            Ok(())
        } else {
            Err(StoreError::UnknownEntry(entry.id.clone()))
        }
    }

    fn delete(&mut self, entry: &CatalogEntry) -> Result<(), StoreError> {
        if self.document.remove_entry(entry)? {
            Ok(())
        } else {
            Err(StoreError::UnknownEntry(entry.id.clone()))
        }
    }

    fn insert(&mut self, entry: &CatalogEntry) -> Result<(), StoreError> {
        self.document.push_entry(entry)
    }

    fn ensure_filter_present(&mut self, label: &str) -> Result<(), StoreError> {
        match self.document.ensure_filter(label) {
            FilterUpdate::NoConfig => warn!(
                path = %self.document.path().display(),
                "Catalog has no config object, skipping filters"
            ),
            FilterUpdate::Updated => debug!(label, "Added filter"),
            FilterUpdate::Unchanged => {}
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<bool, StoreError> {
        self.document.save()
    }
}
