//! Collaborator contracts: content sources, likes, comments.

use std::sync::Arc;

use crate::error::RemoteError;
use crate::filter::{Audience, FeedFilter};
use crate::model::{Comment, CompositeId, ContentKind, FeedItem};

// ── PageQuery ───────────────────────────────────────────────────────

/// One source call: which kind, under which filter, which slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub kind: ContentKind,
    pub filter: FeedFilter,
    pub audience: Audience,
    /// Zero-based page index.
    pub page_index: usize,
    pub page_size: usize,
}

impl PageQuery {
    /// Inclusive `[from, to]` row range: `[index*size, index*size + size - 1]`.
    pub fn range(&self) -> (usize, usize) {
        let from = self.page_index * self.page_size;
        (from, from + self.page_size.saturating_sub(1))
    }
}

// ── ContentSource ───────────────────────────────────────────────────

/// A paginated store of one content kind.
///
/// Returns at most `query.page_size` items, already filtered by time window
/// and audience and ordered by `query.filter.sort_by`. Errors are surfaced
/// verbatim; the engine never retries on its own.
#[async_trait::async_trait]
pub trait ContentSource: Send + Sync + 'static {
    async fn fetch(&self, query: &PageQuery) -> Result<Vec<FeedItem>, RemoteError>;
}

/// The ratings and posts sources a feed draws from.
#[derive(Clone)]
pub struct FeedSources {
    pub ratings: Arc<dyn ContentSource>,
    pub posts: Arc<dyn ContentSource>,
}

impl FeedSources {
    pub fn new(ratings: Arc<dyn ContentSource>, posts: Arc<dyn ContentSource>) -> Self {
        Self { ratings, posts }
    }

    pub fn for_kind(&self, kind: ContentKind) -> &Arc<dyn ContentSource> {
        match kind {
            ContentKind::Rating => &self.ratings,
            ContentKind::Post => &self.posts,
        }
    }
}

// ── LikeService ─────────────────────────────────────────────────────

/// Owner of the viewer's liked-items sets and the backing like mutation.
///
/// The engine calls `toggle_like` fire-and-forget after its optimistic
/// update. Failures are this service's to reconcile.
#[async_trait::async_trait]
pub trait LikeService: Send + Sync + 'static {
    async fn toggle_like(&self, target: CompositeId) -> Result<(), RemoteError>;
}

/// Drops like intents. Default for engines built without a like service.
pub struct NoopLikes;

#[async_trait::async_trait]
impl LikeService for NoopLikes {
    async fn toggle_like(&self, _target: CompositeId) -> Result<(), RemoteError> {
        Ok(())
    }
}

// ── CommentService ──────────────────────────────────────────────────

#[async_trait::async_trait]
pub trait CommentService: Send + Sync + 'static {
    async fn add_comment(&self, target: CompositeId, body: &str) -> Result<Comment, RemoteError>;

    async fn delete_comment(&self, target: CompositeId, comment_id: u64) -> Result<(), RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedSource;

    fn query(page_index: usize, page_size: usize) -> PageQuery {
        PageQuery {
            kind: ContentKind::Rating,
            filter: FeedFilter::default(),
            audience: Audience::Everyone,
            page_index,
            page_size,
        }
    }

    #[test]
    fn range_first_page() {
        assert_eq!(query(0, 7).range(), (0, 6));
    }

    #[test]
    fn range_later_page() {
        assert_eq!(query(2, 3).range(), (6, 8));
        assert_eq!(query(4, 10).range(), (40, 49));
    }

    #[test]
    fn for_kind_picks_matching_source() {
        let ratings: Arc<dyn ContentSource> = Arc::new(ScriptedSource::new());
        let posts: Arc<dyn ContentSource> = Arc::new(ScriptedSource::new());
        let sources = FeedSources::new(ratings.clone(), posts.clone());
        assert!(Arc::ptr_eq(sources.for_kind(ContentKind::Rating), &ratings));
        assert!(Arc::ptr_eq(sources.for_kind(ContentKind::Post), &posts));
    }

    #[tokio::test]
    async fn noop_likes_accepts_everything() {
        assert!(NoopLikes.toggle_like(CompositeId::post(1)).await.is_ok());
    }
}
