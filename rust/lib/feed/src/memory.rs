//! In-memory [`ContentSource`] for demos and tests.

use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::error::RemoteError;
use crate::filter::SortBy;
use crate::model::{ContentKind, FeedItem};
use crate::source::{ContentSource, PageQuery};

/// Holds items of one kind and serves them the way a remote store would:
/// time window and audience applied, sorted by the requested key, sliced by
/// the query's row range.
pub struct MemorySource {
    kind: ContentKind,
    items: RwLock<Vec<FeedItem>>,
    /// Fixed clock for time windows; wall clock when unset.
    now: Option<DateTime<Utc>>,
}

impl MemorySource {
    pub fn new(kind: ContentKind, items: impl IntoIterator<Item = FeedItem>) -> Self {
        let source = Self {
            kind,
            items: RwLock::new(Vec::new()),
            now: None,
        };
        for item in items {
            source.insert(item);
        }
        source
    }

    pub fn ratings(items: impl IntoIterator<Item = FeedItem>) -> Self {
        Self::new(ContentKind::Rating, items)
    }

    pub fn posts(items: impl IntoIterator<Item = FeedItem>) -> Self {
        Self::new(ContentKind::Post, items)
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert or replace by id. Items of the other kind are ignored.
    pub fn insert(&self, item: FeedItem) -> bool {
        if item.kind() != self.kind {
            return false;
        }
        let mut items = self.items.write().unwrap();
        match items.iter_mut().find(|i| i.id() == item.id()) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
        true
    }

    fn select(&self, query: &PageQuery) -> Vec<FeedItem> {
        let since = query.filter.time_period.since(self.now.unwrap_or_else(Utc::now));
        let mut matched: Vec<FeedItem> = self
            .items
            .read()
            .unwrap()
            .iter()
            .filter(|i| since.map_or(true, |t| i.created_at() >= t))
            .filter(|i| query.audience.admits(i.creator()))
            .cloned()
            .collect();

        match query.filter.sort_by {
            SortBy::CreatedAt => matched.sort_by(|a, b| b.created_at().cmp(&a.created_at())),
            SortBy::Likes => matched.sort_by(|a, b| {
                b.like_count()
                    .cmp(&a.like_count())
                    .then_with(|| b.created_at().cmp(&a.created_at()))
            }),
        }

        let (from, _) = query.range();
        matched.into_iter().skip(from).take(query.page_size).collect()
    }
}

#[async_trait::async_trait]
impl ContentSource for MemorySource {
    async fn fetch(&self, query: &PageQuery) -> Result<Vec<FeedItem>, RemoteError> {
        if query.kind != self.kind {
            return Err(RemoteError::new(format!(
                "{} source asked for {}s",
                self.kind, query.kind
            )));
        }
        Ok(self.select(query))
    }
}
