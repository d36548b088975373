//! Thumbnail acquisition and caching.
//!
//! For every fetched item the acquirer walks the item's candidate URLs in
//! order and stores the first successful download as `<id>.<ext>` in the
//! cache directory.
//!
//! # Design Principles
//!
//! - **Never fatal**: a thumbnail that cannot be fetched degrades to a remote URL
//! - **Idempotent**: an existing non-empty file is reused unless forced
//! - **Whole files only**: downloads land via write-then-rename
//! - **Bounded concurrency**: items are acquired in parallel, candidates in order

mod cache;
pub mod client;

pub use cache::{ALLOWED_EXTENSIONS, DEFAULT_EXTENSION, ThumbnailCache, sniff_extension};
pub use client::{HttpImageFetcher, ImageFetcher};

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tracing::{debug, warn};

use crate::model::{CanonicalItem, ResolvedItem};
use crate::source::try_in_order;

/// Default number of items acquired at once
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Why a thumbnail could not be acquired.
///
/// Always recovered locally; the item falls back to a remote URL.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ThumbnailError {
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("Empty response body for {0}")]
    EmptyBody(String),

    #[error("No thumbnail candidates for {0}")]
    NoCandidates(String),

    #[error("Failed all download attempts for {key}: {last}")]
    AllCandidatesFailed { key: String, last: Box<ThumbnailError> },

    #[error("Failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },
}

/// Downloads thumbnails into a cache directory
pub struct ThumbnailAcquirer {
    fetcher: Box<dyn ImageFetcher>,
    concurrency: usize,
    public_mount: String,
}

impl ThumbnailAcquirer {
    /// `public_mount` is the path prefix under which the cache directory is served.
    pub fn new(fetcher: Box<dyn ImageFetcher>, public_mount: impl Into<String>) -> Self {
        Self {
            fetcher,
            concurrency: DEFAULT_CONCURRENCY,
            public_mount: public_mount.into(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Acquire one thumbnail.
    ///
    /// Returns the local path on success or when a cached file is reused,
    /// `None` when every candidate failed.
    pub async fn acquire(
        &self,
        candidates: &[String],
        dest_dir: &Path,
        key_id: &str,
        force: bool,
    ) -> Option<PathBuf> {
        match self.try_acquire(candidates, dest_dir, key_id, force).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(key = key_id, error = %e, "Using remote thumbnail");
                None
            }
        }
    }

    async fn try_acquire(
        &self,
        candidates: &[String],
        dest_dir: &Path,
        key_id: &str,
        force: bool,
    ) -> Result<PathBuf, ThumbnailError> {
        let cache = ThumbnailCache::new(dest_dir);
        cache.ensure_dir().await.map_err(|e| ThumbnailError::Write {
            path: dest_dir.to_path_buf(),
            message: e.to_string(),
        })?;

        if force {
            let removed = cache.purge(key_id).await;
            debug!(key = key_id, removed, "Purged cached thumbnails");
        }

        let first = candidates
            .first()
            .ok_or_else(|| ThumbnailError::NoCandidates(key_id.to_string()))?;
        let path = cache.path_for(key_id, sniff_extension(first));

        if !force && cache.is_populated(&path).await {
            debug!(path = %path.display(), "Thumbnail already cached");
            return Ok(path);
        }

        let data = try_in_order(candidates, |url| async move {
            let result = self.fetcher.fetch(url).await;
            if let Err(ref e) = result {
                debug!(error = %e, "Thumbnail candidate failed");
            }
            result
        })
        .await
        .map_err(|errors| ThumbnailError::AllCandidatesFailed {
            key: key_id.to_string(),
            last: Box::new(
                errors
                    .into_iter()
                    .last()
                    .unwrap_or_else(|| ThumbnailError::NoCandidates(key_id.to_string())),
            ),
        })?;

        cache
            .write_atomic(&path, &data)
            .await
            .map_err(|e| ThumbnailError::Write {
                path: path.clone(),
                message: e.to_string(),
            })?;

        debug!(path = %path.display(), bytes = data.len(), "Thumbnail stored");
        Ok(path)
    }

    /// Acquire thumbnails for every item, preserving input order.
    ///
    /// The asset reference is the public path of the cached file, or the
    /// best candidate URL when acquisition failed.
    pub async fn resolve_all(
        &self,
        items: Vec<CanonicalItem>,
        dest_dir: &Path,
        force: bool,
    ) -> Vec<ResolvedItem> {
        futures::stream::iter(items)
            .map(|item| async move {
                let local = self
                    .acquire(&item.thumbnail_candidates, dest_dir, &item.external_id, force)
                    .await;
                let asset_ref = match local {
                    Some(path) => self.public_ref(&path),
                    None => item.thumbnail_candidates.first().cloned().unwrap_or_default(),
                };
                ResolvedItem { item, asset_ref }
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Public path for a cached file: `<mount>/<file name>`.
    pub fn public_ref(&self, path: &Path) -> String {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mount = self.public_mount.trim_end_matches('/');
        if mount.is_empty() {
            name
        } else {
            format!("{mount}/{name}")
        }
    }
}
