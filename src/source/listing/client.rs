//! Unauthenticated playlist listing client
//!
//! Talks to an Invidious-compatible instance. No API key required, but public
//! instances are rate limited and come and go, so the base URL is configurable.
//!
//! Pages are 1-based; a page past the end comes back with no videos.

use super::{adapter, dto};
use crate::model::CanonicalItem;
use crate::source::domain::SourceError;

/// Default listing instance
pub const DEFAULT_BASE_URL: &str = "https://yewtu.be";

/// Listing client
pub struct ListingClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ListingClient {
    /// Create a client sharing an existing HTTP client
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch one page of the playlist
    pub async fn fetch_page(
        &self,
        playlist_id: &str,
        page: u32,
    ) -> Result<Vec<CanonicalItem>, SourceError> {
        let url = format!(
            "{}/api/v1/playlists/{}?page={}",
            self.base_url,
            urlencoding::encode(playlist_id),
            page.max(1)
        );
        tracing::debug!(playlist_id, page, "Requesting listing page");

        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            if status != reqwest::StatusCode::TOO_MANY_REQUESTS
                && let Ok(error) = response.json::<dto::ErrorResponse>().await
            {
                return Err(SourceError::Api(error.error));
            }
            return Err(SourceError::from_status(status));
        }

        let body = response
            .json::<dto::PlaylistResponse>()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        Ok(adapter::to_items(body, &self.base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ListingClient::new(reqwest::Client::new(), "https://inv.test/");
        assert_eq!(client.base_url, "https://inv.test");
    }
}
