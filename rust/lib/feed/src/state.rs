//! Observable feed state.

use std::collections::HashMap;
use std::fmt;

use crate::error::FeedError;
use crate::filter::{ContentFilter, FeedFilter};
use crate::model::{CompositeId, FeedItem};
use crate::scroll::ScrollPhase;

/// Which feed tab an engine backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedName {
    /// Everyone's content.
    Community,
    /// Content from the viewer's friends.
    Friends,
}

impl FeedName {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedName::Community => "community",
            FeedName::Friends => "friends",
        }
    }

    /// State path of this feed, e.g. `feed/community`.
    pub fn path(self) -> &'static str {
        match self {
            FeedName::Community => "feed/community",
            FeedName::Friends => "feed/friends",
        }
    }
}

impl fmt::Display for FeedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a renderer needs for one feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    /// No two entries share a `CompositeId`; newest first after every merge.
    pub items: Vec<FeedItem>,
    /// 1-based page the next pagination fetch requests.
    pub page: usize,
    pub has_more: bool,
    pub loading: bool,
    /// Last fetch failure, cleared by the next fetch that starts.
    pub error: Option<FeedError>,
    pub filter: FeedFilter,
    pub content_filter: ContentFilter,
    /// Bumped on every refresh or filter change.
    pub generation: u64,
    /// Bumped on every local like or comment-count edit. Never reset.
    pub edit_seq: u64,
    /// `edit_seq` of the last local edit per entry, for the current generation.
    pub local_edits: HashMap<CompositeId, u64>,
}

impl FeedState {
    pub fn new(filter: FeedFilter, content_filter: ContentFilter) -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            has_more: true,
            loading: false,
            error: None,
            filter,
            content_filter,
            generation: 0,
            edit_seq: 0,
            local_edits: HashMap::new(),
        }
    }

    pub fn phase(&self) -> ScrollPhase {
        ScrollPhase::from_loading(self.loading)
    }

    /// Drop accumulated items and start a new generation at page 1.
    pub fn reset(&mut self) {
        self.items.clear();
        self.page = 1;
        self.has_more = true;
        self.error = None;
        self.generation += 1;
        self.local_edits.clear();
    }

    /// Stamp a local edit of `id`.
    pub fn record_edit(&mut self, id: CompositeId) {
        self.edit_seq += 1;
        self.local_edits.insert(id, self.edit_seq);
    }

    /// Whether `id` was edited locally after `edit_seq` was observed.
    pub fn edited_since(&self, id: CompositeId, edit_seq: u64) -> bool {
        self.local_edits.get(&id).is_some_and(|&at| at > edit_seq)
    }
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new(FeedFilter::default(), ContentFilter::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::model::ContentKind;
    use crate::test_support::{rating, ts};

    #[test]
    fn new_state_is_empty_page_one() {
        let state = FeedState::default();
        assert!(state.items.is_empty());
        assert_eq!(state.page, 1);
        assert!(state.has_more);
        assert!(!state.loading);
        assert_eq!(state.generation, 0);
        assert_eq!(state.phase(), ScrollPhase::Idle);
    }

    #[test]
    fn reset_discards_and_bumps_generation() {
        let mut state = FeedState::default();
        state.items.push(rating(1, ts(1, 0)));
        state.page = 4;
        state.has_more = false;
        state.error = Some(FeedError::Fetch {
            kind: ContentKind::Rating,
            source: RemoteError::new("x"),
        });

        state.reset();

        assert!(state.items.is_empty());
        assert_eq!(state.page, 1);
        assert!(state.has_more);
        assert!(state.error.is_none());
        assert_eq!(state.generation, 1);
    }

    #[test]
    fn reset_keeps_filters_and_loading() {
        let mut state = FeedState::new(FeedFilter::default(), ContentFilter::Posts);
        state.loading = true;
        state.reset();
        assert_eq!(state.content_filter, ContentFilter::Posts);
        assert!(state.loading);
    }

    #[test]
    fn edits_are_stamped_and_cleared_by_reset() {
        let mut state = FeedState::default();
        let seen = state.edit_seq;
        state.record_edit(CompositeId::rating(1));

        assert!(state.edited_since(CompositeId::rating(1), seen));
        assert!(!state.edited_since(CompositeId::rating(1), state.edit_seq));
        assert!(!state.edited_since(CompositeId::post(1), seen));

        state.reset();
        assert!(!state.edited_since(CompositeId::rating(1), seen));
        assert_eq!(state.edit_seq, 1);
    }

    #[test]
    fn feed_paths() {
        assert_eq!(FeedName::Community.path(), "feed/community");
        assert_eq!(FeedName::Friends.to_string(), "friends");
    }
}
