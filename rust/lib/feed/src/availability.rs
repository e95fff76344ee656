//! Decides whether another page should be offered.
//!
//! Recomputed from the latest page alone; nothing is accumulated across
//! pages. A source counts as possibly having more when it filled its page.

use crate::config::FeedConfig;
use crate::fetcher::FetchedPage;
use crate::filter::ContentFilter;
use crate::model::ContentKind;

/// `hasMore` after `page` was fetched under `content`.
///
/// Mixed feeds stay open while *either* source saturated its page, since
/// one source running dry says nothing about the other.
pub fn has_more(config: &FeedConfig, content: ContentFilter, page: &FetchedPage) -> bool {
    [ContentKind::Rating, ContentKind::Post]
        .into_iter()
        .filter_map(|kind| {
            config
                .page_size(content, kind)
                .map(|size| page.fetched(kind) >= size)
        })
        .any(|saturated| saturated)
}
