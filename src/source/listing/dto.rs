//! Playlist listing Data Transfer Objects
//!
//! These types match the Invidious-compatible `/api/v1/playlists/{id}` response.
//! DO NOT use these types outside the listing module - convert to domain types.
//!
//! Example response:
//! ```json
//! {
//!   "title": "My Playlist",
//!   "playlistId": "PL...",
//!   "videoCount": 2,
//!   "videos": [{
//!     "title": "Video Title",
//!     "videoId": "dQw4w9WgXcQ",
//!     "index": 0,
//!     "videoThumbnails": [
//!       { "quality": "maxres", "url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxres.jpg", "width": 1280, "height": 720 }
//!     ]
//!   }]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Top-level playlist page
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistResponse {
    pub title: Option<String>,
    pub playlist_id: Option<String>,
    pub video_count: Option<u64>,
    #[serde(default)]
    pub videos: Vec<Video>,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub title: Option<String>,
    pub video_id: Option<String>,
    pub index: Option<u64>,
    #[serde(default)]
    pub video_thumbnails: Vec<VideoThumbnail>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoThumbnail {
    pub quality: Option<String>,
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}
