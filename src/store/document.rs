//! The persisted catalog document.
//!
//! A JSON object holding one ordered collection of gallery items and,
//! optionally, a configuration object with a `filters` list:
//!
//! ```json
//! {
//!   "config": { "filters": ["All", "music"], "perspective": 1600 },
//!   "items": [
//!     { "id": "yt:dQw4w9WgXcQ", "kind": "yt-video", "src": "media/yt/dQw4w9WgXcQ.webp", "tags": ["music"] }
//!   ]
//! }
//! ```
//!
//! Edits are structural: only the keys of entries we touch change. Anything
//! else in the file, including key order, survives a load/save cycle.
//!
//! Ids are not unique: the same item may sit in the collection once per
//! owning tag. Existing elements are therefore addressed by position, and
//! removals are held back until [`CatalogDocument::save`] so positions stay
//! valid for the whole edit session.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::StoreError;
use crate::model::CatalogEntry;

/// Sentinel filter label that shows every item
pub const ALL_FILTER: &str = "All";

/// Where the collection and filter list live inside the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLayout {
    /// Key of the item collection at the document root
    pub collection: String,
    /// Key of the configuration object holding `filters`
    pub config_object: String,
}

impl Default for CatalogLayout {
    fn default() -> Self {
        Self {
            collection: "items".to_string(),
            config_object: "config".to_string(),
        }
    }
}

/// Result of a filter maintenance call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterUpdate {
    /// The list already held every required label
    Unchanged,
    /// Labels were added
    Updated,
    /// The document has no configuration object
    NoConfig,
}

/// An opened catalog document
#[derive(Debug)]
pub struct CatalogDocument {
    path: PathBuf,
    layout: CatalogLayout,
    root: Map<String, Value>,
    /// Positions removed since the last save
    removed: BTreeSet<usize>,
    on_disk: bool,
    dirty: bool,
}

impl CatalogDocument {
    /// Load an existing document.
    pub fn load(path: impl Into<PathBuf>, layout: CatalogLayout) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            return Err(StoreError::NotFound(path));
        }

        let contents = fs::read_to_string(&path).map_err(|e| StoreError::Read(path.clone(), e))?;
        let value: Value = serde_json::from_str(&contents)
            .map_err(|e| StoreError::Parse(path.clone(), e.to_string()))?;
        let Value::Object(root) = value else {
            return Err(StoreError::NotAnObject(path));
        };

        Ok(Self {
            path,
            layout,
            root,
            removed: BTreeSet::new(),
            on_disk: true,
            dirty: false,
        })
    }

    /// An empty in-memory document with an empty collection; nothing is written until saved.
    pub fn create(path: impl Into<PathBuf>, layout: CatalogLayout) -> Self {
        let mut root = Map::new();
        root.insert(layout.collection.clone(), Value::Array(Vec::new()));
        Self {
            path: path.into(),
            layout,
            root,
            removed: BTreeSet::new(),
            on_disk: false,
            dirty: true,
        }
    }

    /// Load the document, or start a new one if the file does not exist.
    pub fn load_or_create(
        path: impl Into<PathBuf>,
        layout: CatalogLayout,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        if path.exists() {
            Self::load(path, layout)
        } else {
            tracing::info!(path = %path.display(), "Catalog not found, starting a new one");
            Ok(Self::create(path, layout))
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Add the collection if the document lacks it.
    pub fn ensure_collection(&mut self) -> Result<(), StoreError> {
        match self.root.get(&self.layout.collection) {
            Some(Value::Array(_)) => Ok(()),
            Some(_) => Err(self.not_a_collection()),
            None => {
                self.root
                    .insert(self.layout.collection.clone(), Value::Array(Vec::new()));
                self.dirty = true;
                Ok(())
            }
        }
    }

    /// Fail unless the collection exists and is an array.
    pub fn require_collection(&self) -> Result<(), StoreError> {
        self.collection().map(|_| ())
    }

    fn collection(&self) -> Result<&Vec<Value>, StoreError> {
        match self.root.get(&self.layout.collection) {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(self.not_a_collection()),
            None => Err(StoreError::MissingCollection(
                self.path.clone(),
                self.layout.collection.clone(),
            )),
        }
    }

    fn collection_mut(&mut self) -> Result<&mut Vec<Value>, StoreError> {
        let err = match self.root.get(&self.layout.collection) {
            Some(Value::Array(_)) => None,
            Some(_) => Some(self.not_a_collection()),
            None => Some(StoreError::MissingCollection(
                self.path.clone(),
                self.layout.collection.clone(),
            )),
        };
        if let Some(err) = err {
            return Err(err);
        }
        match self.root.get_mut(&self.layout.collection) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(StoreError::MissingCollection(
                self.path.clone(),
                self.layout.collection.clone(),
            )),
        }
    }

    fn not_a_collection(&self) -> StoreError {
        StoreError::NotACollection(self.path.clone(), self.layout.collection.clone())
    }

    /// Every well-formed entry, in document order, with its position set.
    ///
    /// Elements that are not objects or lack a string `id` are skipped (and
    /// left untouched on save).
    pub fn entries(&self) -> Vec<CatalogEntry> {
        let Ok(items) = self.collection() else {
            return Vec::new();
        };
        items
            .iter()
            .enumerate()
            .filter(|(position, _)| !self.removed.contains(position))
            .filter_map(|(position, value)| {
                let mut entry = parse_entry(value)?;
                entry.position = Some(position);
                Some(entry)
            })
            .collect()
    }

    /// Whether any live element carries exactly this id.
    pub fn contains_id(&self, id: &str) -> bool {
        let Ok(items) = self.collection() else {
            return false;
        };
        items
            .iter()
            .enumerate()
            .any(|(position, v)| !self.removed.contains(&position) && element_id(v) == Some(id))
    }

    /// Position of `entry` if its element is still live and still carries its id.
    fn locate(&self, entry: &CatalogEntry) -> Option<usize> {
        let position = entry.position?;
        if self.removed.contains(&position) {
            return None;
        }
        let value = self.collection().ok()?.get(position)?;
        (element_id(value) == Some(entry.id.as_str())).then_some(position)
    }

    /// Append a new element.
    pub fn push_entry(&mut self, entry: &CatalogEntry) -> Result<(), StoreError> {
        let value =
            serde_json::to_value(entry).map_err(|e| StoreError::Serialize(e.to_string()))?;
        self.collection_mut()?.push(value);
        self.dirty = true;
        Ok(())
    }

    /// Write the modelled fields of `entry` onto the element it was read from.
    ///
    /// Only fields whose value differs from the stored one are written, so
    /// unchanged keys keep their exact position and formatting.
    /// Returns `false` if `entry` has no live element.
    pub fn patch_entry(&mut self, entry: &CatalogEntry) -> Result<bool, StoreError> {
        let Some(index) = self.locate(entry) else {
            return Ok(false);
        };
        let items = self.collection_mut()?;
        let Some(Value::Object(obj)) = items.get_mut(index) else {
            return Ok(false);
        };
        let Some(current) = parse_entry(&Value::Object(obj.clone())) else {
            return Ok(false);
        };

        let mut changed = false;
        let mut set = |key: &str, value: Value| {
            obj.insert(key.to_string(), value);
            changed = true;
        };

        if current.kind != entry.kind
            && let Some(kind) = &entry.kind
        {
            set("kind", Value::String(kind.clone()));
        }
        if current.asset_ref != entry.asset_ref {
            set("src", Value::String(entry.asset_ref.clone()));
        }
        if current.label != entry.label {
            set("alt", Value::String(entry.label.clone()));
        }
        if current.caption != entry.caption
            && let Some(caption) = &entry.caption
        {
            set("caption", Value::String(caption.clone()));
        }
        if current.link != entry.link
            && let Some(link) = &entry.link
        {
            set("url", Value::String(link.clone()));
        }
        if current.tags != entry.tags {
            set("tags", string_array(&entry.tags));
        }

        self.dirty |= changed;
        Ok(true)
    }

    /// Remove the element `entry` was read from. Returns `false` if it has no live element.
    ///
    /// The element stays in memory until the next save.
    pub fn remove_entry(&mut self, entry: &CatalogEntry) -> Result<bool, StoreError> {
        let Some(index) = self.locate(entry) else {
            return Ok(false);
        };
        self.removed.insert(index);
        self.dirty = true;
        Ok(true)
    }

    /// Drop removed elements from the collection.
    fn compact(&mut self) -> Result<(), StoreError> {
        if self.removed.is_empty() {
            return Ok(());
        }
        let removed = std::mem::take(&mut self.removed);
        let items = self.collection_mut()?;
        let mut position = 0;
        items.retain(|_| {
            let keep = !removed.contains(&position);
            position += 1;
            keep
        });
        Ok(())
    }

    /// Current filter labels, or `None` without a configuration object.
    pub fn filters(&self) -> Option<Vec<String>> {
        let config = self.root.get(&self.layout.config_object)?.as_object()?;
        Some(match config.get("filters") {
            Some(Value::Array(values)) => unique_strings(values),
            _ => Vec::new(),
        })
    }

    /// Make sure the filter list holds the `All` sentinel and `label`.
    ///
    /// Existing labels keep their order; missing ones are appended.
    pub fn ensure_filter(&mut self, label: &str) -> FilterUpdate {
        let Some(Value::Object(config)) = self.root.get_mut(&self.layout.config_object) else {
            return FilterUpdate::NoConfig;
        };

        let original = config.get("filters").cloned();
        let mut labels = match &original {
            Some(Value::Array(values)) => unique_strings(values),
            _ => Vec::new(),
        };
        for wanted in [ALL_FILTER, label] {
            if !wanted.is_empty() && !labels.iter().any(|l| l == wanted) {
                labels.push(wanted.to_string());
            }
        }

        let updated = string_array(&labels);
        if original.as_ref() == Some(&updated) {
            return FilterUpdate::Unchanged;
        }
        config.insert("filters".to_string(), updated);
        self.dirty = true;
        FilterUpdate::Updated
    }

    /// Write the document if it changed or was never written.
    ///
    /// The file is replaced via a sibling `.tmp` file and a rename; a crash
    /// before the rename leaves the previous version in place.
    pub fn save(&mut self) -> Result<bool, StoreError> {
        if !self.dirty && self.on_disk {
            return Ok(false);
        }
        self.compact()?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::Write(parent.to_path_buf(), e))?;
        }

        let mut contents = serde_json::to_string_pretty(&self.root)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        contents.push('\n');

        let mut temp = self.path.as_os_str().to_owned();
        temp.push(".tmp");
        let temp_path = PathBuf::from(temp);

        fs::write(&temp_path, &contents).map_err(|e| StoreError::Write(temp_path.clone(), e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| StoreError::Write(self.path.clone(), e))?;

        self.on_disk = true;
        self.dirty = false;
        tracing::info!(path = %self.path.display(), "Saved catalog");
        Ok(true)
    }
}

fn element_id(value: &Value) -> Option<&str> {
    value.get("id").and_then(Value::as_str)
}

fn parse_entry(value: &Value) -> Option<CatalogEntry> {
    if !value.get("id").is_some_and(Value::is_string) {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

fn unique_strings(values: &[Value]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for s in values.iter().filter_map(Value::as_str) {
        if !out.iter().any(|o| o == s) {
            out.push(s.to_string());
        }
    }
    out
}

fn string_array(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}
