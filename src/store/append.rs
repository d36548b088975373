use std::path::Path;

use super::{CatalogDocument, CatalogLayout, CatalogStore, StoreError, StoreMode, managed_entries};
use crate::model::CatalogEntry;

/// Store that only ever adds entries.
///
/// Existing entries are never rewritten or removed, and the filter list is
/// left to whoever maintains the catalog by hand.
#[derive(Debug)]
pub struct AppendOnlyStore {
    document: CatalogDocument,
}

impl AppendOnlyStore {
    /// Open `path`, starting an empty document if the file or its collection is missing.
    pub fn open(path: &Path, layout: CatalogLayout) -> Result<Self, StoreError> {
        let mut document = CatalogDocument::load_or_create(path, layout)?;
        document.ensure_collection()?;
        Ok(Self { document })
    }
}

impl CatalogStore for AppendOnlyStore {
    fn mode(&self) -> StoreMode {
        StoreMode::Append
    }

    fn list_managed_entries(&self, tag: &str) -> Vec<CatalogEntry> {
        managed_entries(&self.document, tag)
    }

    fn contains(&self, id: &str) -> bool {
        self.document.contains_id(id)
    }

    fn upsert(&mut self, _entry: &CatalogEntry) -> Result<(), StoreError> {
        Err(StoreError::AppendOnly("updates"))
    }

    fn delete(&mut self, _entry: &CatalogEntry) -> Result<(), StoreError> {
        Err(StoreError::AppendOnly("deletes"))
    }

    fn insert(&mut self, entry: &CatalogEntry) -> Result<(), StoreError> {
        self.document.push_entry(entry)
    }

    fn ensure_filter_present(&mut self, _label: &str) -> Result<(), StoreError> {
        Ok(())
    }

    fn commit(&mut self) -> Result<bool, StoreError> {
        self.document.save()
    }
}
