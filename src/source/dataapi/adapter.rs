//! Adapter layer: Convert Data API DTOs to domain models
//!
//! This is the ONLY place where Data API types are converted to domain types.

use super::dto;
use crate::model::CanonicalItem;
use crate::source::domain::{PlaylistPage, canonical_item};

/// Convert one response page, dropping entries without a video id.
pub fn to_page(response: dto::PlaylistItemsResponse) -> PlaylistPage {
    PlaylistPage {
        items: response
            .items
            .into_iter()
            .filter_map(convert_item)
            .collect(),
        next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
    }
}

fn convert_item(item: dto::PlaylistItem) -> Option<CanonicalItem> {
    let from_details = item.content_details.and_then(|d| d.video_id);
    let snippet = item.snippet;

    let from_snippet = snippet
        .as_ref()
        .and_then(|s| s.resource_id.as_ref())
        .and_then(|r| r.video_id.clone());

    let external_id = from_snippet.or(from_details).filter(|id| !id.is_empty())?;

    let (title, thumbnails) = match snippet {
        Some(s) => (
            s.title,
            s.thumbnails
                .into_values()
                .map(|t| (t.width.unwrap_or(0), t.url))
                .collect(),
        ),
        None => (None, Vec::new()),
    };

    Some(canonical_item(external_id, title, None, thumbnails))
}
