//! Source adapter - fetches playlist membership through the fallback tiers
//!
//! Tier order:
//! 1. Data API (only with an API key)
//! 2. Listing with unbounded pagination
//! 3. Data API once more (only with an API key)
//! 4. Listing limited to a few pages, only if nothing above responded at all
//!
//! A tier that answers with zero items hands over to the next one. If every
//! tier answers but none has items, the playlist is treated as empty rather
//! than as a failure.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use super::dataapi::{DataApiClient, MAX_PAGE_SIZE};
use super::domain::{FetchError, PlaylistRef, SourceError, Tier, TierFailure, dedupe_and_cap};
use super::fallback::try_in_order;
use super::listing::ListingClient;
use super::traits::{PlaylistApi, PlaylistListing};
use crate::config::SourceConfig;
use crate::model::CanonicalItem;

/// Default page budget for the best-effort tier
pub const DEFAULT_BEST_EFFORT_PAGES: u32 = 1;

/// A tier that did not produce items. `error` is `None` for empty answers.
struct TierMiss {
    tier: Tier,
    error: Option<SourceError>,
}

/// Fetches playlist items with layered fallback
pub struct SourceAdapter {
    api: Option<Box<dyn PlaylistApi>>,
    listing: Box<dyn PlaylistListing>,
    best_effort_pages: u32,
}

impl SourceAdapter {
    /// Create an adapter backed only by the unauthenticated listing
    pub fn new(listing: Box<dyn PlaylistListing>) -> Self {
        Self {
            api: None,
            listing,
            best_effort_pages: DEFAULT_BEST_EFFORT_PAGES,
        }
    }

    /// Enable the credentialed tiers
    pub fn with_api(mut self, api: Box<dyn PlaylistApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Page budget for the best-effort tier (at least one page)
    pub fn with_best_effort_pages(mut self, pages: u32) -> Self {
        self.best_effort_pages = pages.max(1);
        self
    }

    /// Build the production adapter from config
    pub fn from_config(
        http_client: reqwest::Client,
        config: &SourceConfig,
        api_key: Option<&str>,
    ) -> Self {
        let listing = ListingClient::new(http_client.clone(), &config.listing_base_url);
        let adapter = Self::new(Box::new(listing)).with_best_effort_pages(config.best_effort_pages);

        match api_key.filter(|k| !k.trim().is_empty()) {
            Some(key) => adapter.with_api(Box::new(DataApiClient::new(
                http_client,
                key.trim(),
                &config.api_base_url,
            ))),
            None => adapter,
        }
    }

    /// Whether the credentialed tiers are enabled
    pub fn has_api(&self) -> bool {
        self.api.is_some()
    }

    /// Fetch up to `max_items` items of a playlist.
    ///
    /// Returns an empty list when the playlist is reachable but has no items.
    pub async fn fetch(
        &self,
        playlist: &PlaylistRef,
        max_items: Option<usize>,
    ) -> Result<Vec<CanonicalItem>, FetchError> {
        let mut tiers = Vec::with_capacity(4);
        if self.has_api() {
            tiers.push(Tier::DataApi);
        }
        tiers.push(Tier::Listing);
        if self.has_api() {
            tiers.push(Tier::DataApiRetry);
        }
        tiers.push(Tier::BestEffort);

        let saw_empty = AtomicBool::new(false);

        let result = try_in_order(tiers, |tier| {
            let saw_empty = &saw_empty;
            async move {
                if tier == Tier::BestEffort && saw_empty.load(Ordering::Relaxed) {
                    debug!("Skipping best-effort tier, playlist already answered empty");
                    return Err(TierMiss { tier, error: None });
                }

                match self.run_tier(tier, &playlist.id, max_items).await {
                    Ok(items) if !items.is_empty() => Ok((tier, items)),
                    Ok(_) => {
                        info!(%tier, "Tier returned no items");
                        saw_empty.store(true, Ordering::Relaxed);
                        Err(TierMiss { tier, error: None })
                    }
                    Err(e) => {
                        warn!(%tier, error = %e, "Playlist fetch tier failed");
                        Err(TierMiss { tier, error: Some(e) })
                    }
                }
            }
        })
        .await;

        match result {
            Ok((tier, items)) => {
                let items = dedupe_and_cap(items, max_items);
                info!(%tier, count = items.len(), playlist = %playlist.id, "Fetched playlist");
                Ok(items)
            }
            Err(_) if saw_empty.load(Ordering::Relaxed) => Ok(Vec::new()),
            Err(misses) => Err(FetchError::Exhausted {
                playlist: playlist.input.clone(),
                failures: misses
                    .into_iter()
                    .filter_map(|m| m.error.map(|error| TierFailure { tier: m.tier, error }))
                    .collect(),
            }),
        }
    }

    async fn run_tier(
        &self,
        tier: Tier,
        playlist_id: &str,
        max_items: Option<usize>,
    ) -> Result<Vec<CanonicalItem>, SourceError> {
        match (tier, &self.api) {
            (Tier::DataApi | Tier::DataApiRetry, Some(api)) => {
                fetch_from_api(api.as_ref(), playlist_id, max_items).await
            }
            (Tier::DataApi | Tier::DataApiRetry, None) => {
                Err(SourceError::Api("no API key configured".to_string()))
            }
            (Tier::Listing, _) => {
                fetch_from_listing(self.listing.as_ref(), playlist_id, max_items, None).await
            }
            (Tier::BestEffort, _) => {
                fetch_from_listing(
                    self.listing.as_ref(),
                    playlist_id,
                    max_items,
                    Some(self.best_effort_pages),
                )
                .await
            }
        }
    }
}

/// Page through the credentialed API. Any page failure fails the whole tier.
async fn fetch_from_api(
    api: &dyn PlaylistApi,
    playlist_id: &str,
    max_items: Option<usize>,
) -> Result<Vec<CanonicalItem>, SourceError> {
    let mut items: Vec<CanonicalItem> = Vec::new();
    let mut token: Option<String> = None;

    loop {
        let remaining = max_items.map(|m| m.saturating_sub(items.len()));
        if remaining == Some(0) {
            break;
        }
        let page_size = remaining
            .map(|r| r.min(MAX_PAGE_SIZE as usize) as u32)
            .unwrap_or(MAX_PAGE_SIZE);

        let page = api.fetch_page(playlist_id, page_size, token.as_deref()).await?;
        debug!(count = page.items.len(), "Data API page received");
        items.extend(page.items);

        match page.next_page_token {
            Some(next) if token.as_deref() != Some(next.as_str()) => token = Some(next),
            _ => break,
        }
    }

    Ok(dedupe_and_cap(items, max_items))
}

/// Page through the listing until an empty page, the item cap or the page limit.
async fn fetch_from_listing(
    listing: &dyn PlaylistListing,
    playlist_id: &str,
    max_items: Option<usize>,
    page_limit: Option<u32>,
) -> Result<Vec<CanonicalItem>, SourceError> {
    let mut items: Vec<CanonicalItem> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut page = 1u32;

    loop {
        if max_items.is_some_and(|m| items.len() >= m) {
            break;
        }
        if page_limit.is_some_and(|limit| page > limit) {
            break;
        }

        let batch = listing.fetch_page(playlist_id, page).await?;
        if batch.is_empty() {
            break;
        }

        // Some instances ignore the page parameter and repeat the first page.
        let before = items.len();
        for item in batch {
            if seen.insert(item.external_id.clone()) {
                items.push(item);
            }
        }
        if items.len() == before {
            break;
        }
        page += 1;
    }

    Ok(dedupe_and_cap(items, max_items))
}
