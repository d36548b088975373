//! Internal domain types for playlist fetching.
//!
//! Both provider clients convert their responses into [`CanonicalItem`]s here,
//! so the rest of the crate never sees a provider DTO.

use std::fmt;

use reqwest::Url;

use crate::model::CanonicalItem;

/// Base of the deterministic thumbnail origin.
const THUMBNAIL_ORIGIN: &str = "https://i.ytimg.com";

/// Watch page used when a provider omits the item URL.
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// A playlist identifier resolved from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRef {
    /// The raw input, kept for messages
    pub input: String,
    /// Canonical playlist id
    pub id: String,
}

impl PlaylistRef {
    /// Accepts a bare playlist id or a URL carrying a `list` query parameter.
    pub fn parse(input: &str) -> Result<Self, InvalidPlaylistRef> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(InvalidPlaylistRef::Empty);
        }

        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            let url = Url::parse(trimmed)
                .map_err(|e| InvalidPlaylistRef::BadUrl(trimmed.to_string(), e.to_string()))?;
            let id = url
                .query_pairs()
                .find(|(k, _)| k == "list")
                .map(|(_, v)| v.into_owned())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| InvalidPlaylistRef::MissingListParam(trimmed.to_string()))?;
            return Ok(Self {
                input: trimmed.to_string(),
                id,
            });
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(InvalidPlaylistRef::BadId(trimmed.to_string()));
        }

        Ok(Self {
            input: trimmed.to_string(),
            id: trimmed.to_string(),
        })
    }
}

/// Why a playlist reference could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPlaylistRef {
    #[error("playlist reference is empty")]
    Empty,

    #[error("invalid playlist URL {0}: {1}")]
    BadUrl(String, String),

    #[error("playlist URL {0} has no `list` parameter")]
    MissingListParam(String),

    #[error("invalid playlist id: {0:?}")]
    BadId(String),
}

/// One page of results from the credentialed API.
#[derive(Debug, Clone, Default)]
pub struct PlaylistPage {
    pub items: Vec<CanonicalItem>,
    pub next_page_token: Option<String>,
}

/// A fallback strategy in the fetch chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Credentialed API, first attempt
    DataApi,
    /// Unauthenticated listing with unbounded pagination
    Listing,
    /// Credentialed API, second attempt after the listing failed
    DataApiRetry,
    /// Listing with a bounded page count
    BestEffort,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::DataApi => "data-api",
            Tier::Listing => "listing",
            Tier::DataApiRetry => "data-api-retry",
            Tier::BestEffort => "best-effort",
        };
        f.write_str(name)
    }
}

/// Errors from a single provider request.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    #[error("API request failed: {0}")]
    Api(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Rate limited - try again later")]
    RateLimited,
}

impl SourceError {
    pub(crate) fn from_status(status: reqwest::StatusCode) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Self::RateLimited;
        }
        Self::Http {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }
}

/// A tier that did not produce items, and why.
#[derive(Debug, Clone)]
pub struct TierFailure {
    pub tier: Tier,
    pub error: SourceError,
}

impl fmt::Display for TierFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.tier, self.error)
    }
}

/// Every fetch tier was exhausted without a successful response.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to fetch playlist {playlist}: {}", join_failures(.failures))]
    Exhausted {
        playlist: String,
        failures: Vec<TierFailure>,
    },
}

fn join_failures(failures: &[TierFailure]) -> String {
    if failures.is_empty() {
        return "no fetch tier available".to_string();
    }
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Deterministic thumbnail URLs for an item, best first.
pub fn preferred_thumbnail_urls(external_id: &str) -> Vec<String> {
    vec![
        format!("{THUMBNAIL_ORIGIN}/vi_webp/{external_id}/maxresdefault.webp"),
        format!("{THUMBNAIL_ORIGIN}/vi/{external_id}/maxresdefault.jpg"),
        format!("{THUMBNAIL_ORIGIN}/vi/{external_id}/hqdefault.jpg"),
    ]
}

/// Default link for an item when the provider gives none.
pub fn watch_url(external_id: &str) -> String {
    format!("{WATCH_URL}{external_id}")
}

/// Build a canonical item from provider fields.
///
/// `provider_thumbnails` are `(width, url)` pairs in any order; they are
/// appended after the deterministic origin URLs, widest first.
pub fn canonical_item(
    external_id: String,
    title: Option<String>,
    url: Option<String>,
    mut provider_thumbnails: Vec<(u32, String)>,
) -> CanonicalItem {
    provider_thumbnails.sort_by(|a, b| b.0.cmp(&a.0));

    let mut candidates = preferred_thumbnail_urls(&external_id);
    for (_, thumb) in provider_thumbnails {
        if !thumb.is_empty() && !candidates.contains(&thumb) {
            candidates.push(thumb);
        }
    }

    CanonicalItem {
        canonical_url: url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| watch_url(&external_id)),
        title: title.unwrap_or_default(),
        thumbnail_candidates: candidates,
        external_id,
    }
}

/// Drop duplicate ids (first occurrence wins) and cap the list.
pub fn dedupe_and_cap(items: Vec<CanonicalItem>, max_items: Option<usize>) -> Vec<CanonicalItem> {
    let mut seen = std::collections::HashSet::new();
    let mut out: Vec<CanonicalItem> = items
        .into_iter()
        .filter(|it| !it.external_id.is_empty() && seen.insert(it.external_id.clone()))
        .collect();
    if let Some(max) = max_items {
        out.truncate(max);
    }
    out
}
