//! YouTube Data API v3 Data Transfer Objects
//!
//! These types match what the `playlistItems` endpoint returns.
//! DO NOT use these types outside the dataapi module - convert to domain types.
//!
//! API Reference: https://developers.google.com/youtube/v3/docs/playlistItems/list
//!
//! Example response:
//! ```json
//! {
//!   "nextPageToken": "EAAaBlBUOkNBVQ",
//!   "items": [{
//!     "snippet": {
//!       "title": "Video Title",
//!       "resourceId": { "kind": "youtube#video", "videoId": "dQw4w9WgXcQ" },
//!       "thumbnails": {
//!         "default": { "url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/default.jpg", "width": 120, "height": 90 },
//!         "high": { "url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg", "width": 480, "height": 360 }
//!       }
//!     }
//!   }]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level `playlistItems.list` response
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemsResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    pub next_page_token: Option<String>,
}

/// Error envelope returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

/// A single playlist entry
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub snippet: Option<Snippet>,
    pub content_details: Option<ContentDetails>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub title: Option<String>,
    pub resource_id: Option<ResourceId>,
    /// Keyed by quality name: default, medium, high, standard, maxres
    #[serde(default)]
    pub thumbnails: BTreeMap<String, Thumbnail>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDetails {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_with_token() {
        let json = r#"{
            "kind": "youtube#playlistItemListResponse",
            "nextPageToken": "TOKEN2",
            "items": [{
                "snippet": {
                    "title": "Hello",
                    "resourceId": { "kind": "youtube#video", "videoId": "abc" },
                    "thumbnails": { "high": { "url": "https://x/hq.jpg", "width": 480, "height": 360 } }
                }
            }]
        }"#;
        let parsed: PlaylistItemsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.next_page_token.as_deref(), Some("TOKEN2"));
        let snippet = parsed.items[0].snippet.as_ref().unwrap();
        assert_eq!(
            snippet.resource_id.as_ref().unwrap().video_id.as_deref(),
            Some("abc")
        );
        assert_eq!(snippet.thumbnails["high"].width, Some(480));
    }

    #[test]
    fn test_parse_last_page_without_items() {
        let parsed: PlaylistItemsResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.items.is_empty());
        assert!(parsed.next_page_token.is_none());
    }

    #[test]
    fn test_parse_error_envelope() {
        let json = r#"{"error": {"code": 403, "message": "quotaExceeded", "errors": []}}"#;
        let parsed: ErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.error.code, 403);
        assert_eq!(parsed.error.message, "quotaExceeded");
    }
}
