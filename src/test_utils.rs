//! Test utilities and fixtures for aperture-sync tests.
//!
//! Provides catalog files in temporary directories and ready-made items so
//! store, reconciler and sync tests don't repeat the same JSON.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{entry, read_catalog, write_catalog};
//!
//! let temp = tempfile::TempDir::new().unwrap();
//! let path = write_catalog(temp.path(), &json!({ "items": [entry("v1", &["music"])] }));
//! // ... run something against `path`
//! let saved = read_catalog(&path);
//! ```

use std::path::{Path, PathBuf};

use serde_json::{Value, json};

use crate::model::{CanonicalItem, ResolvedItem};
use crate::source::domain::{canonical_item, watch_url};

/// JSON for a sync-managed entry with id `yt:<external_id>`.
///
/// Presentation fields match what [`resolved`] produces for the same id,
/// so a sync with unchanged input leaves the entry as is.
pub fn entry(external_id: &str, tags: &[&str]) -> Value {
    json!({
        "id": format!("yt:{external_id}"),
        "kind": "yt-video",
        "src": format!("media/yt/{external_id}.webp"),
        "alt": format!("Title {external_id}"),
        "caption": format!("Title {external_id}"),
        "url": watch_url(external_id),
        "tags": tags,
    })
}

/// JSON for a hand-authored gallery image that the sync never manages.
pub fn image_entry(id: &str, tags: &[&str]) -> Value {
    json!({
        "id": id,
        "src": format!("media/{id}.jpg"),
        "alt": id,
        "tags": tags,
    })
}

/// Write `document` as `catalog.json` inside `dir` and return its path.
pub fn write_catalog(dir: &Path, document: &Value) -> PathBuf {
    let path = dir.join("catalog.json");
    let text = serde_json::to_string_pretty(document).expect("Failed to serialize catalog");
    std::fs::write(&path, text).expect("Failed to write catalog");
    path
}

/// Parse the catalog at `path`.
pub fn read_catalog(path: &Path) -> Value {
    let text = std::fs::read_to_string(path).expect("Failed to read catalog");
    serde_json::from_str(&text).expect("Catalog is not valid JSON")
}

/// Ids of the `items` collection, in document order.
pub fn catalog_ids(path: &Path) -> Vec<String> {
    read_catalog(path)["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// A canonical item titled `Title <external_id>`.
pub fn canonical(external_id: &str) -> CanonicalItem {
    canonical_item(
        external_id.to_string(),
        Some(format!("Title {external_id}")),
        None,
        vec![],
    )
}

/// A resolved item whose thumbnail was cached as `media/yt/<id>.webp`.
pub fn resolved(external_id: &str) -> ResolvedItem {
    ResolvedItem {
        item: canonical(external_id),
        asset_ref: format!("media/yt/{external_id}.webp"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CatalogEntry;

    #[test]
    fn test_entry_matches_resolved_item() {
        let parsed: CatalogEntry = serde_json::from_value(entry("v1", &["music"])).unwrap();
        assert_eq!(parsed, resolved("v1").to_entry("music"));
    }

    #[test]
    fn test_write_and_read_catalog() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = write_catalog(
            temp.path(),
            &json!({ "items": [entry("v1", &["a"]), image_entry("cat-1", &["cat"])] }),
        );
        assert_eq!(catalog_ids(&path), ["yt:v1", "cat-1"]);
    }
}
