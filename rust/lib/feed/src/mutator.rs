//! Optimistic, local-only edits of feed entries.
//!
//! Each edit touches exactly one entry, located by [`CompositeId`]; every
//! other entry and the order of the list stay as they were. Nothing here is
//! rolled back if the backing mutation later fails.

use std::collections::HashSet;

use crate::model::{CompositeId, ContentKind, FeedItem, ItemId};

/// Read-only snapshot of the viewer's liked ratings and liked posts.
///
/// Owned and updated by the like service; the engine only reads it to
/// decide which way a toggle goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikedItems {
    ratings: HashSet<ItemId>,
    posts: HashSet<ItemId>,
}

impl LikedItems {
    pub fn new<R, P>(ratings: R, posts: P) -> Self
    where
        R: IntoIterator<Item = ItemId>,
        P: IntoIterator<Item = ItemId>,
    {
        Self {
            ratings: ratings.into_iter().collect(),
            posts: posts.into_iter().collect(),
        }
    }

    pub fn contains(&self, target: CompositeId) -> bool {
        match target.kind {
            ContentKind::Rating => self.ratings.contains(&target.id),
            ContentKind::Post => self.posts.contains(&target.id),
        }
    }

    /// Flip membership of `target`. Used by like-service implementations.
    pub fn toggle(&mut self, target: CompositeId) -> bool {
        let set = match target.kind {
            ContentKind::Rating => &mut self.ratings,
            ContentKind::Post => &mut self.posts,
        };
        if set.remove(&target.id) {
            false
        } else {
            set.insert(target.id);
            true
        }
    }
}

/// Apply a like toggle to `target`: +1 if not yet liked, -1 (clamped at 0)
/// if liked. Returns the new liked flag, or `None` if `target` isn't in
/// `items`.
pub fn toggle_like(items: &mut [FeedItem], target: CompositeId, liked: &LikedItems) -> Option<bool> {
    let item = find_mut(items, target)?;
    let was_liked = liked.contains(target);
    let count = item.like_count_mut();
    *count = if was_liked {
        count.saturating_sub(1)
    } else {
        count.saturating_add(1)
    };
    Some(!was_liked)
}

/// Shift `target`'s comment count by `delta`, clamped at 0. Returns the new
/// count, or `None` if `target` isn't in `items`.
pub fn adjust_comment_count(items: &mut [FeedItem], target: CompositeId, delta: i64) -> Option<u32> {
    let item = find_mut(items, target)?;
    let count = item.comment_count_mut();
    let next = (i64::from(*count) + delta).clamp(0, i64::from(u32::MAX));
    *count = next as u32;
    Some(*count)
}

/// Carry the local like and comment counts over onto fresh copies of
/// entries for which `edited` holds. Everything else on the fresh copy wins.
///
/// Used when a page lands that was requested before the local edit, so its
/// counts predate it.
pub fn keep_local_counts(
    local: &[FeedItem],
    fresh: &mut [FeedItem],
    edited: impl Fn(CompositeId) -> bool,
) {
    for item in fresh.iter_mut() {
        let id = item.composite_id();
        if !edited(id) {
            continue;
        }
        if let Some(current) = local.iter().find(|i| i.composite_id() == id) {
            *item.like_count_mut() = current.like_count();
            *item.comment_count_mut() = current.comment_count();
        }
    }
}

fn find_mut(items: &mut [FeedItem], target: CompositeId) -> Option<&mut FeedItem> {
    items.iter_mut().find(|item| item.composite_id() == target)
}
