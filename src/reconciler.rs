//! Tag-scoped reconciliation of fetched items against the catalog.
//!
//! A tag owns the entries that carry it. For the running tag:
//!
//! - owned entries still in the playlist get their presentation refreshed
//! - owned entries that left the playlist lose the tag, and are deleted
//!   once no tag is left
//! - playlist items with no owned entry are inserted, tagged with the tag
//!
//! Entries the tag does not own are never edited. An item another tag
//! already holds gets a separate entry for this tag, so the same id may
//! appear more than once in the catalog. Under [`StoreMode::Append`] only
//! unseen ids are inserted.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::{debug, info};

use crate::model::ResolvedItem;
use crate::store::{CatalogStore, StoreError, StoreMode};

/// Counts of catalog edits made by one reconcile pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Owned entries refreshed from the playlist
    pub updated: usize,
    /// Entries that lost the tag but are kept for other tags
    pub retired: usize,
    /// Entries deleted after losing their last tag
    pub deleted: usize,
    /// New entries
    pub inserted: usize,
}

impl ReconcileReport {
    pub fn total(&self) -> usize {
        self.updated + self.retired + self.deleted + self.inserted
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Updated: {}, Retired: {}, Removed: {}, Added: {}",
            self.updated, self.retired, self.deleted, self.inserted
        )
    }
}

/// Bring the catalog in line with `desired` for `tag`.
///
/// `desired` is in playlist order; new entries are appended in that order.
/// Edits are staged on the store; the caller commits.
pub fn reconcile(
    store: &mut dyn CatalogStore,
    desired: &[ResolvedItem],
    tag: &str,
) -> Result<ReconcileReport, StoreError> {
    let report = match store.mode() {
        StoreMode::Append => append_unseen(store, desired, tag)?,
        StoreMode::Reconcile => reconcile_owned(store, desired, tag)?,
    };
    info!(tag, mode = %store.mode(), %report, "Reconciled catalog");
    Ok(report)
}

fn append_unseen(
    store: &mut dyn CatalogStore,
    desired: &[ResolvedItem],
    tag: &str,
) -> Result<ReconcileReport, StoreError> {
    let mut report = ReconcileReport::default();
    for resolved in desired {
        let entry = resolved.to_entry(tag);
        if store.contains(&entry.id) {
            debug!(id = %entry.id, "Already in catalog");
            continue;
        }
        store.insert(&entry)?;
        report.inserted += 1;
    }
    Ok(report)
}

fn reconcile_owned(
    store: &mut dyn CatalogStore,
    desired: &[ResolvedItem],
    tag: &str,
) -> Result<ReconcileReport, StoreError> {
    store.ensure_filter_present(tag)?;

    let mut by_key: HashMap<&str, &ResolvedItem> = HashMap::new();
    for resolved in desired {
        by_key.entry(resolved.item.external_id.as_str()).or_insert(resolved);
    }

    let managed = store.list_managed_entries(tag);
    info!(tag, count = managed.len(), "Existing entries for tag");

    let mut report = ReconcileReport::default();
    let mut placed: HashSet<String> = HashSet::new();

    for mut entry in managed {
        let key = entry.external_key().to_string();
        match by_key.get(key.as_str()) {
            Some(resolved) => {
                entry.apply_presentation(resolved);
                store.upsert(&entry)?;
                report.updated += 1;
                placed.insert(key);
            }
            None => {
                entry.remove_tag(tag);
                if entry.tags.is_empty() {
                    store.delete(&entry)?;
                    report.deleted += 1;
                } else {
                    store.upsert(&entry)?;
                    report.retired += 1;
                }
            }
        }
    }

    for resolved in desired {
        if !placed.insert(resolved.item.external_id.clone()) {
            continue;
        }
        let entry = resolved.to_entry(tag);
        if store.contains(&entry.id) {
            debug!(id = %entry.id, "Id held by another tag, adding a separate entry");
        }
        store.insert(&entry)?;
        report.inserted += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AppendOnlyStore, CatalogLayout, ReconcileStore};
    use crate::test_utils::{catalog_ids, entry, image_entry, read_catalog, resolved, write_catalog};
    use serde_json::json;
    use std::path::Path;
    use tempfile::TempDir;

    fn run(path: &Path, mode: StoreMode, desired: &[ResolvedItem], tag: &str) -> ReconcileReport {
        let mut store: Box<dyn CatalogStore> = match mode {
            StoreMode::Append => Box::new(AppendOnlyStore::open(path, CatalogLayout::default()).unwrap()),
            StoreMode::Reconcile => {
                Box::new(ReconcileStore::open(path, CatalogLayout::default()).unwrap())
            }
        };
        let report = reconcile(store.as_mut(), desired, tag).unwrap();
        store.commit().unwrap();
        report
    }

    #[test]
    fn test_update_delete_insert_scenario() {
        let temp = TempDir::new().unwrap();
        let path = write_catalog(
            temp.path(),
            &json!({ "items": [entry("v1", &["music"]), entry("v3", &["music"])] }),
        );

        let mut v1 = resolved("v1");
        v1.item.title = "New title".to_string();
        let report = run(&path, StoreMode::Reconcile, &[v1, resolved("v2")], "music");

        assert_eq!(
            report,
            ReconcileReport {
                updated: 1,
                retired: 0,
                deleted: 1,
                inserted: 1
            }
        );
        assert_eq!(catalog_ids(&path), ["yt:v1", "yt:v2"]);
        let saved = read_catalog(&path);
        assert_eq!(saved["items"][0]["alt"], json!("New title"));
        assert_eq!(saved["items"][0]["caption"], json!("New title"));
        assert_eq!(saved["items"][1]["tags"], json!(["music"]));
    }

    #[test]
    fn test_retire_keeps_entry_shared_with_other_tag() {
        let temp = TempDir::new().unwrap();
        let path = write_catalog(
            temp.path(),
            &json!({ "items": [entry("x", &["A", "B"])] }),
        );

        let report = run(&path, StoreMode::Reconcile, &[], "A");
        assert_eq!(report.retired, 1);
        assert_eq!(report.deleted, 0);
        assert_eq!(read_catalog(&path)["items"][0]["tags"], json!(["B"]));
    }

    #[test]
    fn test_entries_owned_by_other_tags_are_untouched() {
        let temp = TempDir::new().unwrap();
        let mut cat = image_entry("cat-1", &["cat"]);
        cat["rotateX"] = json!(4);
        let doc = json!({ "items": [cat.clone(), entry("v5", &["live"]), entry("v1", &["music"])] });
        let path = write_catalog(temp.path(), &doc);

        run(&path, StoreMode::Reconcile, &[resolved("v2")], "music");

        let saved = read_catalog(&path);
        assert_eq!(saved["items"][0], cat);
        assert_eq!(saved["items"][1], doc["items"][1]);
        assert_eq!(catalog_ids(&path), ["cat-1", "yt:v5", "yt:v2"]);
    }

    #[test]
    fn test_unprefixed_ids_still_match() {
        let temp = TempDir::new().unwrap();
        let mut legacy = entry("v1", &["music"]);
        legacy["id"] = json!("v1");
        let path = write_catalog(temp.path(), &json!({ "items": [legacy] }));

        let report = run(&path, StoreMode::Reconcile, &[resolved("v1")], "music");
        assert_eq!(report.updated, 1);
        assert_eq!(report.inserted, 0);
        assert_eq!(catalog_ids(&path), ["v1"]);
    }

    #[test]
    fn test_entry_of_other_tag_is_left_alone() {
        let temp = TempDir::new().unwrap();
        let mut curated = entry("v1", &["live"]);
        curated["alt"] = json!("Curated");
        let path = write_catalog(temp.path(), &json!({ "items": [curated.clone()] }));

        let report = run(&path, StoreMode::Reconcile, &[resolved("v1")], "music");
        assert_eq!(report.inserted, 1);
        let saved = read_catalog(&path);
        assert_eq!(saved["items"][0], curated);
        assert_eq!(saved["items"][1]["tags"], json!(["music"]));
        assert_eq!(catalog_ids(&path), ["yt:v1", "yt:v1"]);

        // The next run refreshes only the entry this tag owns.
        let report = run(&path, StoreMode::Reconcile, &[resolved("v1")], "music");
        assert_eq!(report, ReconcileReport { updated: 1, ..Default::default() });
        assert_eq!(read_catalog(&path)["items"][0], curated);
    }

    #[test]
    fn test_retiring_duplicate_spares_other_tags_copy() {
        let temp = TempDir::new().unwrap();
        let live = entry("v1", &["live"]);
        let path = write_catalog(
            temp.path(),
            &json!({ "items": [live.clone(), entry("v1", &["music"]), entry("v2", &["music"])] }),
        );

        let report = run(&path, StoreMode::Reconcile, &[resolved("v2")], "music");
        assert_eq!(report.deleted, 1);
        assert_eq!(report.updated, 1);
        let saved = read_catalog(&path);
        assert_eq!(saved["items"][0], live);
        assert_eq!(catalog_ids(&path), ["yt:v1", "yt:v2"]);
    }

    #[test]
    fn test_reconcile_maintains_filters() {
        let temp = TempDir::new().unwrap();
        let path = write_catalog(
            temp.path(),
            &json!({ "config": { "filters": ["Nature"] }, "items": [] }),
        );

        run(&path, StoreMode::Reconcile, &[resolved("v1")], "music");
        assert_eq!(
            read_catalog(&path)["config"]["filters"],
            json!(["Nature", "All", "music"])
        );
    }

    #[test]
    fn test_append_only_never_touches_existing_entries() {
        let temp = TempDir::new().unwrap();
        let doc = json!({
            "config": { "filters": ["All"] },
            "items": [entry("v1", &["music"]), entry("v3", &["music"])]
        });
        let path = write_catalog(temp.path(), &doc);

        let mut v1 = resolved("v1");
        v1.asset_ref = "elsewhere.jpg".to_string();
        let report = run(&path, StoreMode::Append, &[v1, resolved("v2")], "music");

        assert_eq!(
            report,
            ReconcileReport {
                inserted: 1,
                ..Default::default()
            }
        );
        let saved = read_catalog(&path);
        assert_eq!(saved["items"][0], doc["items"][0]);
        assert_eq!(saved["items"][1], doc["items"][1]);
        assert_eq!(saved["config"], doc["config"]);
        assert_eq!(catalog_ids(&path), ["yt:v1", "yt:v3", "yt:v2"]);
    }

    #[test]
    fn test_append_only_skips_ids_of_any_tag() {
        let temp = TempDir::new().unwrap();
        let path = write_catalog(temp.path(), &json!({ "items": [entry("v1", &["live"])] }));

        let report = run(&path, StoreMode::Append, &[resolved("v1")], "music");
        assert_eq!(report.total(), 0);
        assert_eq!(read_catalog(&path)["items"][0]["tags"], json!(["live"]));
    }

    #[test]
    fn test_duplicate_desired_items_inserted_once() {
        let temp = TempDir::new().unwrap();
        let path = write_catalog(temp.path(), &json!({ "items": [] }));

        let report = run(
            &path,
            StoreMode::Reconcile,
            &[resolved("v1"), resolved("v1")],
            "music",
        );
        assert_eq!(report.inserted, 1);
        assert_eq!(catalog_ids(&path), ["yt:v1"]);
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let temp = TempDir::new().unwrap();
        let path = write_catalog(
            temp.path(),
            &json!({ "config": {}, "items": [entry("v1", &["music", "live"]), entry("v9", &["music"])] }),
        );
        let desired = [resolved("v1"), resolved("v2")];

        run(&path, StoreMode::Reconcile, &desired, "music");
        let first = std::fs::read_to_string(&path).unwrap();

        let report = run(&path, StoreMode::Reconcile, &desired, "music");
        assert_eq!(report.updated, 2);
        assert_eq!(report.inserted + report.deleted + report.retired, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn test_report_summary_line() {
        let report = ReconcileReport {
            updated: 3,
            retired: 1,
            deleted: 2,
            inserted: 4,
        };
        assert_eq!(report.to_string(), "Updated: 3, Retired: 1, Removed: 2, Added: 4");
        assert_eq!(report.total(), 10);
    }
}
