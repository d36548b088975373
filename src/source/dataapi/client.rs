//! YouTube Data API HTTP client
//!
//! Pages through `playlistItems` with an API key.
//! See: https://developers.google.com/youtube/v3/docs/playlistItems/list
//!
//! The API caps `maxResults` at 50 per page.

use super::{adapter, dto};
use crate::source::domain::{PlaylistPage, SourceError};

/// Largest page the API will return
pub const MAX_PAGE_SIZE: u32 = 50;

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Data API client
pub struct DataApiClient {
    api_key: String,
    http_client: reqwest::Client,
    base_url: String,
}

impl DataApiClient {
    /// Create a client sharing an existing HTTP client
    pub fn new(
        http_client: reqwest::Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch one page of playlist items
    pub async fn fetch_page(
        &self,
        playlist_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage, SourceError> {
        let response = self
            .send_page_request(playlist_id, page_size, page_token)
            .await?;
        Ok(adapter::to_page(response))
    }

    fn page_url(&self, playlist_id: &str, page_size: u32, page_token: Option<&str>) -> String {
        let mut url = format!(
            "{}/playlistItems?part=snippet&maxResults={}&playlistId={}&key={}",
            self.base_url,
            page_size.clamp(1, MAX_PAGE_SIZE),
            urlencoding::encode(playlist_id),
            urlencoding::encode(&self.api_key),
        );
        if let Some(token) = page_token {
            url.push_str("&pageToken=");
            url.push_str(&urlencoding::encode(token));
        }
        url
    }

    async fn send_page_request(
        &self,
        playlist_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<dto::PlaylistItemsResponse, SourceError> {
        let url = self.page_url(playlist_id, page_size, page_token);
        tracing::debug!(playlist_id, page_token, "Requesting Data API page");

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
                return Err(SourceError::Api(format!(
                    "{} ({})",
                    error.error.message, error.error.code
                )));
            }
            return Err(SourceError::from_status(status));
        }

        response
            .json::<dto::PlaylistItemsResponse>()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))
    }
}
