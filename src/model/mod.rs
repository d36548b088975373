//! Core data models for playlist sync.
//!
//! Defines the three records that flow through a run:
//! - [`CanonicalItem`] - a playlist member as normalized by the source adapter
//! - [`ResolvedItem`] - a canonical item plus its resolved asset reference
//! - [`CatalogEntry`] - the persisted record in the catalog document
//!
//! Canonical and resolved items are transient and live for one run.
//! Catalog entries are durable and owned by one or more tags.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Namespace prefix that marks a catalog id as sync-managed media.
pub const ID_PREFIX: &str = "yt:";

/// Kind discriminant written on every entry the sync creates.
pub const MANAGED_KIND: &str = "yt-video";

/// A playlist member as returned by a source tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalItem {
    /// Provider id, unique within one fetch
    pub external_id: String,
    /// Display title (may be empty)
    pub title: String,
    /// Link to the item on the provider
    pub canonical_url: String,
    /// Thumbnail URLs, highest quality first
    pub thumbnail_candidates: Vec<String>,
}

impl CanonicalItem {
    /// Namespaced catalog id for this item.
    pub fn catalog_id(&self) -> String {
        namespaced_id(&self.external_id)
    }
}

/// A canonical item after thumbnail acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedItem {
    pub item: CanonicalItem,
    /// Public path of the cached thumbnail, or a remote URL when acquisition failed
    pub asset_ref: String,
}

impl ResolvedItem {
    /// Build the catalog entry a fresh sync would insert for this item.
    pub fn to_entry(&self, tag: &str) -> CatalogEntry {
        CatalogEntry {
            id: self.item.catalog_id(),
            kind: Some(MANAGED_KIND.to_string()),
            asset_ref: self.asset_ref.clone(),
            label: self.item.title.clone(),
            caption: Some(self.item.title.clone()),
            link: Some(self.item.canonical_url.clone()),
            tags: vec![tag.to_string()],
            extra: Map::new(),
            position: None,
        }
    }
}

/// A persisted catalog record.
///
/// Field names on disk follow the gallery item schema (`src`, `alt`, `url`).
/// Fields this crate does not model are kept in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "src", default)]
    pub asset_ref: String,
    #[serde(rename = "alt", default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(rename = "url", default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Index in the collection this entry was read from; `None` until stored.
    ///
    /// Ids may repeat across tags, so stores address existing entries by position.
    #[serde(skip)]
    pub position: Option<usize>,
}

impl CatalogEntry {
    /// Whether this entry is owned by `tag`.
    pub fn is_managed_by(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Provider key for matching against fetched items.
    pub fn external_key(&self) -> &str {
        external_key(&self.id)
    }

    /// Drop `tag` from the tag set; returns true if it was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    /// Overwrite the presentation fields from a resolved item.
    ///
    /// Tags and unmodelled fields are left alone.
    pub fn apply_presentation(&mut self, resolved: &ResolvedItem) {
        self.asset_ref = resolved.asset_ref.clone();
        self.label = resolved.item.title.clone();
        self.caption = Some(resolved.item.title.clone());
        self.link = Some(resolved.item.canonical_url.clone());
    }
}

/// Prefix an external id with the sync namespace.
pub fn namespaced_id(external_id: &str) -> String {
    format!("{ID_PREFIX}{external_id}")
}

/// Strip the sync namespace from a catalog id, if present.
pub fn external_key(id: &str) -> &str {
    id.strip_prefix(ID_PREFIX).unwrap_or(id)
}

/// Tags may be hand-edited; keep string labels in order and drop anything else.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let mut out: Vec<String> = Vec::new();
    if let Some(Value::Array(items)) = value {
        for item in items {
            if let Value::String(s) = item
                && !out.contains(&s)
            {
                out.push(s);
            }
        }
    }
    Ok(out)
}
