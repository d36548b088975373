//! Batch orchestration.
//!
//! One playlist runs as fetch, thumbnail acquisition, reconcile, commit.
//! Batches run their playlists one after another and stop at the first
//! failure; earlier playlists stay committed.

mod batch;

pub use batch::{BatchDefaults, BatchFile, DEFAULT_OUT_DIR, DEFAULT_TARGET, PlaylistSpec, RunDefaults};

use std::path::PathBuf;

use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result, ResultExt};
use crate::reconciler::{ReconcileReport, reconcile};
use crate::source::{PlaylistRef, SourceAdapter, build_http_client};
use crate::store::{CatalogLayout, StoreMode, open_store};
use crate::thumbnail::{HttpImageFetcher, ThumbnailAcquirer};

/// A fully resolved playlist run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncJob {
    /// Tag that owns this playlist's entries
    pub tag: String,
    pub playlist: PlaylistRef,
    /// Thumbnail cache directory
    pub out_dir: PathBuf,
    /// Catalog file
    pub target: PathBuf,
    pub mode: StoreMode,
    /// Item cap; `None` fetches everything
    pub max: Option<usize>,
    /// Re-download thumbnails even when cached
    pub force: bool,
}

/// Result of one playlist run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The playlist answered with no items; the catalog was not opened
    NothingToSync,
    /// The catalog was reconciled and committed
    Synced(ReconcileReport),
}

/// Runs playlists against one catalog layout
pub struct Syncer {
    source: SourceAdapter,
    thumbnails: ThumbnailAcquirer,
    layout: CatalogLayout,
}

impl Syncer {
    pub fn new(source: SourceAdapter, thumbnails: ThumbnailAcquirer, layout: CatalogLayout) -> Self {
        Self {
            source,
            thumbnails,
            layout,
        }
    }

    /// Build the production pipeline. `api_key` enables the credentialed tiers.
    pub fn from_config(config: &Config, api_key: Option<&str>) -> Result<Self> {
        let http = build_http_client(config.source.timeout())?;
        let source = SourceAdapter::from_config(http.clone(), &config.source, api_key);
        if !source.has_api() {
            info!("No API key configured, using the public listing only");
        }
        let thumbnails = ThumbnailAcquirer::new(
            Box::new(HttpImageFetcher::new(http)),
            config.thumbnails.public_mount.clone(),
        )
        .with_concurrency(config.thumbnails.concurrency);

        Ok(Self::new(source, thumbnails, config.catalog.layout()))
    }

    /// Sync one playlist into its catalog.
    pub async fn run_one(&self, job: &SyncJob) -> Result<SyncOutcome> {
        info!(tag = %job.tag, playlist = %job.playlist.id, mode = %job.mode, "Syncing playlist");

        let items = self.source.fetch(&job.playlist, job.max).await?;
        if items.is_empty() {
            info!(tag = %job.tag, "Nothing to sync");
            return Ok(SyncOutcome::NothingToSync);
        }

        let resolved = self
            .thumbnails
            .resolve_all(items, &job.out_dir, job.force)
            .await;

        let target = job.target.display().to_string();
        let mut store = open_store(job.mode, &job.target, self.layout.clone())
            .with_context(format!("while opening {target}"))?;
        let report = reconcile(store.as_mut(), &resolved, &job.tag)
            .with_context(format!("while reconciling '{}'", job.tag))?;
        store
            .commit()
            .with_context(format!("while saving {target}"))?;

        info!(tag = %job.tag, %report, "Playlist synced");
        Ok(SyncOutcome::Synced(report))
    }

    /// Run every playlist in order.
    ///
    /// All entries are validated before the first one runs. The first
    /// failing playlist aborts the batch.
    pub async fn run_all(
        &self,
        entries: &[PlaylistSpec],
        defaults: &RunDefaults,
    ) -> Result<Vec<(SyncJob, SyncOutcome)>> {
        let jobs = entries
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                spec.resolve(defaults)
                    .map_err(|e| Error::from(e).context(format!("playlist entry {}", i + 1)))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut outcomes = Vec::with_capacity(jobs.len());
        for (i, job) in jobs.into_iter().enumerate() {
            info!(entry = i + 1, of = entries.len(), tag = %job.tag, "Batch entry");
            let outcome = self.run_one(&job).await?;
            outcomes.push((job, outcome));
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::traits::PlaylistListing;
    use crate::source::traits::mocks::MockListing;
    use crate::source::{SourceError, domain::canonical_item};
    use crate::model::CanonicalItem;
    use crate::store::StoreError;
    use crate::test_utils::{catalog_ids, entry, read_catalog, write_catalog};
    use crate::thumbnail::client::mocks::MockFetcher;
    use serde_json::json;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn item(id: &str) -> CanonicalItem {
        canonical_item(id.to_string(), Some(format!("Title {id}")), None, vec![])
    }

    /// Serves the first thumbnail candidate of each item.
    fn fetcher_for(items: &[CanonicalItem]) -> MockFetcher {
        items.iter().fold(MockFetcher::new(), |f, i| {
            f.serve(&i.thumbnail_candidates[0], b"img")
        })
    }

    fn syncer(listing: impl PlaylistListing + 'static, fetcher: MockFetcher) -> Syncer {
        Syncer::new(
            SourceAdapter::new(Box::new(listing)),
            ThumbnailAcquirer::new(Box::new(fetcher), "media/yt"),
            CatalogLayout::default(),
        )
    }

    fn job(dir: &Path, tag: &str, mode: StoreMode) -> SyncJob {
        SyncJob {
            tag: tag.to_string(),
            playlist: PlaylistRef::parse("PL1").unwrap(),
            out_dir: dir.join("public/media/yt"),
            target: dir.join("catalog.json"),
            mode,
            max: None,
            force: false,
        }
    }

    #[tokio::test]
    async fn test_append_run_creates_catalog_and_thumbnails() {
        let temp = TempDir::new().unwrap();
        let items = vec![item("v1"), item("v2")];
        let syncer = syncer(MockListing::with_pages(vec![items.clone()]), fetcher_for(&items));
        let job = job(temp.path(), "music", StoreMode::Append);

        let outcome = syncer.run_one(&job).await.unwrap();
        assert_eq!(
            outcome,
            SyncOutcome::Synced(ReconcileReport {
                inserted: 2,
                ..Default::default()
            })
        );

        assert_eq!(catalog_ids(&job.target), ["yt:v1", "yt:v2"]);
        let saved = read_catalog(&job.target);
        assert_eq!(saved["items"][0]["src"], json!("media/yt/v1.webp"));
        assert_eq!(saved["items"][0]["kind"], json!("yt-video"));
        assert!(job.out_dir.join("v2.webp").is_file());
    }

    #[tokio::test]
    async fn test_failed_thumbnail_uses_remote_url() {
        let temp = TempDir::new().unwrap();
        let items = vec![item("v1")];
        let syncer = syncer(MockListing::with_pages(vec![items.clone()]), MockFetcher::new());
        let job = job(temp.path(), "music", StoreMode::Append);

        syncer.run_one(&job).await.unwrap();
        assert_eq!(
            read_catalog(&job.target)["items"][0]["src"],
            items[0].thumbnail_candidates[0].as_str()
        );
    }

    #[tokio::test]
    async fn test_empty_playlist_leaves_catalog_alone() {
        let temp = TempDir::new().unwrap();
        let syncer = syncer(MockListing::with_pages(vec![]), MockFetcher::new());
        let job = job(temp.path(), "music", StoreMode::Reconcile);
        write_catalog(temp.path(), &json!({ "items": [entry("v1", &["music"])] }));

        let outcome = syncer.run_one(&job).await.unwrap();
        assert_eq!(outcome, SyncOutcome::NothingToSync);
        assert_eq!(catalog_ids(&job.target), ["yt:v1"]);
    }

    #[tokio::test]
    async fn test_reconcile_requires_existing_catalog() {
        let temp = TempDir::new().unwrap();
        let items = vec![item("v1")];
        let syncer = syncer(MockListing::with_pages(vec![items.clone()]), fetcher_for(&items));
        let job = job(temp.path(), "music", StoreMode::Reconcile);

        let err = syncer.run_one(&job).await.unwrap_err();
        assert!(matches!(
            err,
            Error::WithContext { ref source, .. } if matches!(**source, Error::Store(StoreError::NotFound(_)))
        ));
        assert!(!job.target.exists());
    }

    #[tokio::test]
    async fn test_reconcile_run_edits_catalog() {
        let temp = TempDir::new().unwrap();
        write_catalog(
            temp.path(),
            &json!({
                "config": { "filters": ["All"] },
                "items": [entry("v1", &["music"]), entry("v3", &["music", "live"])]
            }),
        );
        let items = vec![item("v1"), item("v2")];
        let syncer = syncer(MockListing::with_pages(vec![items.clone()]), fetcher_for(&items));
        let job = job(temp.path(), "music", StoreMode::Reconcile);

        let outcome = syncer.run_one(&job).await.unwrap();
        assert_eq!(
            outcome,
            SyncOutcome::Synced(ReconcileReport {
                updated: 1,
                retired: 1,
                deleted: 0,
                inserted: 1
            })
        );
        let saved = read_catalog(&job.target);
        assert_eq!(catalog_ids(&job.target), ["yt:v1", "yt:v3", "yt:v2"]);
        assert_eq!(saved["items"][1]["tags"], json!(["live"]));
        assert_eq!(saved["config"]["filters"], json!(["All", "music"]));
    }

    #[tokio::test]
    async fn test_run_all_validates_before_running() {
        let temp = TempDir::new().unwrap();
        let items = vec![item("v1")];
        let syncer = syncer(MockListing::with_pages(vec![items.clone()]), fetcher_for(&items));
        let defaults = RunDefaults {
            target: temp.path().join("catalog.json"),
            out_dir: temp.path().join("media"),
            ..Default::default()
        };
        let entries = [PlaylistSpec::new("music", "PL1"), PlaylistSpec::new("", "PL2")];

        let err = syncer.run_all(&entries, &defaults).await.unwrap_err();
        assert!(err.to_string().contains("playlist entry 2"));
        assert!(!defaults.target.exists());
    }

    #[tokio::test]
    async fn test_run_all_stops_at_first_fetch_failure() {
        let temp = TempDir::new().unwrap();
        let listing = Arc::new(MockListing::with_error(SourceError::Network("down".to_string())));
        let syncer = syncer(SharedListing(listing.clone()), MockFetcher::new());
        let defaults = RunDefaults {
            target: temp.path().join("catalog.json"),
            out_dir: temp.path().join("media"),
            ..Default::default()
        };
        let entries = [PlaylistSpec::new("a", "PL1"), PlaylistSpec::new("b", "PL2")];

        let err = syncer.run_all(&entries, &defaults).await.unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
        // Listing and best-effort tiers for the first entry only.
        assert_eq!(listing.call_count(), 2);
        assert!(!defaults.target.exists());
    }

    #[tokio::test]
    async fn test_run_all_runs_entries_in_order() {
        let temp = TempDir::new().unwrap();
        let items = vec![item("v1")];
        let syncer = syncer(MockListing::with_pages(vec![items.clone()]), fetcher_for(&items));
        let defaults = RunDefaults {
            target: temp.path().join("catalog.json"),
            out_dir: temp.path().join("media"),
            ..Default::default()
        };
        let entries = [PlaylistSpec::new("a", "PL1"), PlaylistSpec::new("b", "PL2")];

        let outcomes = syncer.run_all(&entries, &defaults).await.unwrap();
        let tags: Vec<_> = outcomes.iter().map(|(job, _)| job.tag.as_str()).collect();
        assert_eq!(tags, ["a", "b"]);
        // Second append finds the id already present.
        assert_eq!(
            outcomes[1].1,
            SyncOutcome::Synced(ReconcileReport::default())
        );
        assert_eq!(read_catalog(&defaults.target)["items"][0]["tags"], json!(["a"]));
    }

    struct SharedListing(Arc<MockListing>);

    #[async_trait::async_trait]
    impl PlaylistListing for SharedListing {
        async fn fetch_page(
            &self,
            playlist_id: &str,
            page: u32,
        ) -> std::result::Result<Vec<CanonicalItem>, SourceError> {
            self.0.fetch_page(playlist_id, page).await
        }
    }
}
