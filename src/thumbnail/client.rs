//! Thumbnail HTTP fetcher
//!
//! Downloads a single candidate URL. Candidate ordering and caching live in
//! the acquirer; this only turns one URL into bytes or an error.

use async_trait::async_trait;

use super::ThumbnailError;

/// Fetch the raw bytes behind an image URL.
///
/// Implement this trait to substitute a mock in tests.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// A non-success status or an empty body is an error.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ThumbnailError>;
}

/// Image fetcher over a shared reqwest client
pub struct HttpImageFetcher {
    http_client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ThumbnailError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ThumbnailError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();

        if !status.is_success() {
            return Err(ThumbnailError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| ThumbnailError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if data.is_empty() {
            return Err(ThumbnailError::EmptyBody(url.to_string()));
        }

        Ok(data.to_vec())
    }
}
