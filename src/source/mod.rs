//! Source adapter - fetches playlist membership from remote providers.
//!
//! # Architecture
//!
//! Same layering for every provider:
//! - **Domain models** (`domain.rs`) - our types, independent of any API
//! - **API DTOs** (`dataapi/dto.rs`, `listing/dto.rs`) - exact response shapes
//! - **Adapters** - convert DTOs to [`CanonicalItem`]s
//! - **Clients** - HTTP clients for each provider
//! - **Service** - the tiered fallback chain over both providers
//!
//! # Usage
//!
//! ```ignore
//! use aperture_sync::source::{PlaylistRef, SourceAdapter};
//!
//! let adapter = SourceAdapter::from_config(http, &config.source, api_key.as_deref());
//! let playlist = PlaylistRef::parse("https://www.youtube.com/playlist?list=PL...")?;
//! let items = adapter.fetch(&playlist, Some(200)).await?;
//! ```
//!
//! [`CanonicalItem`]: crate::model::CanonicalItem

pub mod dataapi;
pub mod domain;
pub mod fallback;
pub mod listing;
pub mod service;
pub mod traits;

pub use domain::{FetchError, InvalidPlaylistRef, PlaylistRef, SourceError, Tier, TierFailure};
pub use fallback::try_in_order;
pub use service::SourceAdapter;

use std::time::Duration;

/// Build the shared HTTP client used by every provider and the thumbnail fetcher.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .gzip(true)
        .timeout(timeout)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
}
