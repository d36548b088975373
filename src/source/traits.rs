//! Trait definitions for the playlist provider clients.
//!
//! These traits let the fetch chain run against mock providers in tests.
//! Production code uses [`DataApiClient`] and [`ListingClient`].
//!
//! [`DataApiClient`]: super::dataapi::DataApiClient
//! [`ListingClient`]: super::listing::ListingClient

use async_trait::async_trait;

use super::domain::{PlaylistPage, SourceError};
use crate::model::CanonicalItem;

/// Credentialed, token-paged playlist API.
#[async_trait]
pub trait PlaylistApi: Send + Sync {
    /// Fetch one page; `page_token` is `None` for the first page.
    async fn fetch_page(
        &self,
        playlist_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage, SourceError>;
}

/// Unauthenticated, number-paged playlist listing.
#[async_trait]
pub trait PlaylistListing: Send + Sync {
    /// Fetch a 1-based page; an empty result means past the end.
    async fn fetch_page(
        &self,
        playlist_id: &str,
        page: u32,
    ) -> Result<Vec<CanonicalItem>, SourceError>;
}

#[async_trait]
impl PlaylistApi for super::dataapi::DataApiClient {
    async fn fetch_page(
        &self,
        playlist_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage, SourceError> {
        self.fetch_page(playlist_id, page_size, page_token).await
    }
}

#[async_trait]
impl PlaylistListing for super::listing::ListingClient {
    async fn fetch_page(
        &self,
        playlist_id: &str,
        page: u32,
    ) -> Result<Vec<CanonicalItem>, SourceError> {
        self.fetch_page(playlist_id, page).await
    }
}
