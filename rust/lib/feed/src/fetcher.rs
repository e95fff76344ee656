use tracing::{debug, warn};

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::filter::{Audience, ContentFilter, FeedFilter};
use crate::model::{ContentKind, FeedItem};
use crate::source::{FeedSources, PageQuery};

/// Items returned for one logical page, split by source.
///
/// A source that was not queried contributes an empty list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedPage {
    pub ratings: Vec<FeedItem>,
    pub posts: Vec<FeedItem>,
}

impl FetchedPage {
    pub fn fetched(&self, kind: ContentKind) -> usize {
        match kind {
            ContentKind::Rating => self.ratings.len(),
            ContentKind::Post => self.posts.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.ratings.len() + self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ratings first, then posts.
    pub fn into_items(self) -> impl Iterator<Item = FeedItem> {
        self.ratings.into_iter().chain(self.posts)
    }
}

/// Issues the source calls for one logical page.
///
/// Both calls run concurrently and are joined all-or-nothing: if either
/// fails the whole page fails and the other result is dropped.
pub struct PageFetcher {
    sources: FeedSources,
    audience: Audience,
    config: FeedConfig,
}

impl PageFetcher {
    pub fn new(sources: FeedSources, audience: Audience, config: FeedConfig) -> Self {
        Self { sources, audience, config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn audience(&self) -> &Audience {
        &self.audience
    }

    /// Fetch 1-based `page` under the given filters.
    pub async fn fetch(
        &self,
        filter: &FeedFilter,
        content: ContentFilter,
        page: usize,
    ) -> Result<FetchedPage, FeedError> {
        if self.audience.is_empty() {
            debug!("audience is empty, skipping source calls");
            return Ok(FetchedPage::default());
        }

        let ratings = self.fetch_kind(ContentKind::Rating, filter, content, page);
        let posts = self.fetch_kind(ContentKind::Post, filter, content, page);
        let (ratings, posts) = tokio::try_join!(ratings, posts)?;

        Ok(FetchedPage { ratings, posts })
    }

    async fn fetch_kind(
        &self,
        kind: ContentKind,
        filter: &FeedFilter,
        content: ContentFilter,
        page: usize,
    ) -> Result<Vec<FeedItem>, FeedError> {
        let Some(page_size) = self.config.page_size(content, kind) else {
            return Ok(Vec::new());
        };

        let query = PageQuery {
            kind,
            filter: *filter,
            audience: self.audience.clone(),
            page_index: page.saturating_sub(1),
            page_size,
        };

        let mut items = self
            .sources
            .for_kind(kind)
            .fetch(&query)
            .await
            .map_err(|source| FeedError::Fetch { kind, source })?;

        let before = items.len();
        items.retain(|item| item.kind() == kind);
        items.truncate(page_size);
        if items.len() != before {
            warn!(
                "{kind} source returned {before} items for a page of {page_size}, kept {}",
                items.len()
            );
        }
        Ok(items)
    }
}
