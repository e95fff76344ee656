use std::collections::HashMap;

use crate::model::{CompositeId, FeedItem};

/// Merge freshly fetched items into the accumulated feed.
///
/// - One entry per [`CompositeId`]. When an identity is already present the
///   fresh copy replaces it, since it carries the latest counts.
/// - The result is ordered by `created_at`, newest first. The sort is
///   stable: equal timestamps keep accumulated-then-fetched order.
///
/// Merging the same fresh slice twice gives the same result as once.
pub fn merge_page<I>(previous: &[FeedItem], fresh: I) -> Vec<FeedItem>
where
    I: IntoIterator<Item = FeedItem>,
{
    let mut merged: Vec<FeedItem> = Vec::with_capacity(previous.len());
    let mut positions: HashMap<CompositeId, usize> = HashMap::with_capacity(previous.len());

    let mut place = |item: FeedItem, merged: &mut Vec<FeedItem>| {
        let id = item.composite_id();
        match positions.get(&id).copied() {
            Some(at) => merged[at] = item,
            None => {
                positions.insert(id, merged.len());
                merged.push(item);
            }
        }
    };

    for item in previous.iter().cloned() {
        place(item, &mut merged);
    }
    for item in fresh {
        place(item, &mut merged);
    }

    merged.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    merged
}
