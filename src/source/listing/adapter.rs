//! Adapter layer: Convert listing DTOs to domain models

use super::dto;
use crate::model::CanonicalItem;
use crate::source::domain::canonical_item;

/// Convert one listing page, resolving instance-relative thumbnail URLs.
pub fn to_items(response: dto::PlaylistResponse, base_url: &str) -> Vec<CanonicalItem> {
    response
        .videos
        .into_iter()
        .filter_map(|video| convert_video(video, base_url))
        .collect()
}

fn convert_video(video: dto::Video, base_url: &str) -> Option<CanonicalItem> {
    let external_id = video.video_id.filter(|id| !id.is_empty())?;
    let thumbnails = video
        .video_thumbnails
        .into_iter()
        .map(|t| (t.width.unwrap_or(0), absolutize(&t.url, base_url)))
        .collect();

    Some(canonical_item(external_id, video.title, None, thumbnails))
}

fn absolutize(url: &str, base_url: &str) -> String {
    if let Some(rest) = url.strip_prefix("//") {
        format!("https://{rest}")
    } else if url.starts_with('/') {
        format!("{base_url}{url}")
    } else {
        url.to_string()
    }
}
