use std::future::Future;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::availability::has_more;
use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::fetcher::{FetchedPage, PageFetcher};
use crate::filter::{Audience, ContentFilter, FeedFilter};
use crate::merger::merge_page;
use crate::model::{Comment, CompositeId, FeedItem};
use crate::mutator::{self, LikedItems};
use crate::scroll::{PullGesture, PullOutcome, RefreshMethod, Trigger};
use crate::source::{CommentService, FeedSources, LikeService, NoopLikes};
use crate::state::{FeedName, FeedState};
use crate::store::{FeedStore, SubscriptionId};

/// What a started fetch needs to know, captured when it was admitted.
#[derive(Debug, Clone, Copy)]
struct FetchTicket {
    generation: u64,
    page: usize,
    filter: FeedFilter,
    content: ContentFilter,
    /// Local edits stamped after this are newer than the page's counts.
    edit_seq: u64,
}

impl FetchTicket {
    fn of(state: &FeedState) -> Self {
        Self {
            generation: state.generation,
            page: state.page,
            filter: state.filter,
            content: state.content_filter,
            edit_seq: state.edit_seq,
        }
    }
}

enum Landed {
    Merged { items: usize, has_more: bool },
    Failed(FeedError),
}

/// One feed instance: community or friends, parameterized by its audience.
///
/// The public surface mirrors what a renderer needs:
/// - observable state: [`state`](Self::state), [`subscribe`](Self::subscribe)
/// - callbacks: [`on_scroll_near_end`](Self::on_scroll_near_end),
///   [`on_refresh`](Self::on_refresh), [`on_filter_change`](Self::on_filter_change),
///   [`on_content_filter_change`](Self::on_content_filter_change), [`retry`](Self::retry)
/// - optimistic edits: [`toggle_like`](Self::toggle_like),
///   [`adjust_comment_count`](Self::adjust_comment_count)
///
/// Callbacks that start a fetch apply their state transition when called,
/// not when the returned future is first polled. A filter change therefore
/// clears `items` before the caller awaits anything.
pub struct FeedEngine {
    name: FeedName,
    fetcher: PageFetcher,
    likes: Arc<dyn LikeService>,
    store: FeedStore,
    pull: Mutex<PullGesture>,
}

impl FeedEngine {
    pub fn new(name: FeedName, sources: FeedSources, audience: Audience, config: FeedConfig) -> Self {
        let pull = PullGesture::new(config.pull);
        Self {
            name,
            fetcher: PageFetcher::new(sources, audience, config),
            likes: Arc::new(NoopLikes),
            store: FeedStore::default(),
            pull: Mutex::new(pull),
        }
    }

    pub fn with_like_service(mut self, likes: Arc<dyn LikeService>) -> Self {
        self.likes = likes;
        self
    }

    /// Start from the given filters instead of the defaults.
    pub fn with_filters(self, filter: FeedFilter, content: ContentFilter) -> Self {
        Self {
            store: FeedStore::new(FeedState::new(filter, content)),
            ..self
        }
    }

    pub fn name(&self) -> FeedName {
        self.name
    }

    pub fn config(&self) -> &FeedConfig {
        self.fetcher.config()
    }

    pub fn audience(&self) -> &Audience {
        self.fetcher.audience()
    }

    // ====================================================================
    // Observable state
    // ====================================================================

    pub fn state(&self) -> Arc<FeedState> {
        self.store.get()
    }

    pub fn items(&self) -> Vec<FeedItem> {
        self.store.get().items.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.store.get().loading
    }

    pub fn has_more(&self) -> bool {
        self.store.get().has_more
    }

    pub fn error(&self) -> Option<FeedError> {
        self.store.get().error.clone()
    }

    /// Called synchronously with every published state.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&FeedState) + Send + Sync + 'static,
    {
        self.store.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.store.unsubscribe(id);
    }

    // ====================================================================
    // Callbacks
    // ====================================================================

    /// The feed view became active: load page 1.
    pub fn activate(&self) -> impl Future<Output = ()> + Send + '_ {
        self.on_refresh(RefreshMethod::Initial)
    }

    /// The end-of-list sentinel became visible. No-op while a fetch is in
    /// flight, after the last page, or while a failure awaits a retry.
    pub fn on_scroll_near_end(&self) -> impl Future<Output = ()> + Send + '_ {
        let ticket = self.begin(Trigger::SentinelVisible);
        self.drive(ticket)
    }

    /// Discard everything and load page 1. Supersedes any fetch in flight.
    pub fn on_refresh(&self, method: RefreshMethod) -> impl Future<Output = ()> + Send + '_ {
        let ticket = self.begin(Trigger::Refresh(method));
        self.drive(ticket)
    }

    /// Switch sort mode / time window. Setting the current filter again is
    /// a no-op.
    pub fn on_filter_change(&self, filter: FeedFilter) -> impl Future<Output = ()> + Send + '_ {
        let ticket = self.restart(|state| {
            if state.filter == filter {
                return false;
            }
            state.filter = filter;
            true
        });
        self.drive(ticket)
    }

    /// Switch between all content, ratings only and posts only. Setting the
    /// current content filter again is a no-op.
    pub fn on_content_filter_change(
        &self,
        content: ContentFilter,
    ) -> impl Future<Output = ()> + Send + '_ {
        let ticket = self.restart(|state| {
            if state.content_filter == content {
                return false;
            }
            state.content_filter = content;
            true
        });
        self.drive(ticket)
    }

    /// Re-request the page whose fetch failed. No-op without a pending error.
    pub fn retry(&self) -> impl Future<Output = ()> + Send + '_ {
        let ticket = self.begin(Trigger::Retry);
        self.drive(ticket)
    }

    // ====================================================================
    // Pull to refresh
    // ====================================================================

    pub fn pull_start(&self, at_top: bool) {
        self.pull.lock().unwrap().start(at_top);
    }

    /// Returns the damped visual offset for the raw drag distance.
    pub fn pull_move(&self, raw_delta: f64) -> f64 {
        self.pull.lock().unwrap().update(raw_delta)
    }

    /// Release the gesture. If it passed the threshold a pull refresh starts
    /// immediately; the returned future resolves to whether it did, once
    /// page 1 has landed.
    pub fn pull_release(&self) -> impl Future<Output = bool> + Send + '_ {
        let outcome = self.pull.lock().unwrap().release();
        let ticket = match outcome {
            PullOutcome::Refresh => self.begin(Trigger::Refresh(RefreshMethod::Pull)),
            PullOutcome::Cancel => None,
        };
        let refreshed = ticket.is_some();
        async move {
            self.drive(ticket).await;
            refreshed
        }
    }

    // ====================================================================
    // Optimistic mutations
    // ====================================================================

    /// Flip the viewer's like on `target` locally, then hand the intent to
    /// the like service without waiting for it.
    ///
    /// `liked` is the like service's current snapshot. Returns the new liked
    /// flag, or `None` if `target` is not in the feed (nothing dispatched).
    /// Must be called from within a Tokio runtime.
    pub fn toggle_like(&self, target: CompositeId, liked: &LikedItems) -> Option<bool> {
        let now_liked = self
            .store
            .update(|state| {
                let liked = mutator::toggle_like(&mut state.items, target, liked)?;
                state.record_edit(target);
                Some(liked)
            })?;
        debug!("{}: optimistic like on {target} -> {now_liked}", self.name);

        let likes = Arc::clone(&self.likes);
        let name = self.name;
        tokio::spawn(async move {
            if let Err(e) = likes.toggle_like(target).await {
                // Not rolled back; the like service reconciles.
                warn!("{name}: like on {target} failed: {e}");
            }
        });
        Some(now_liked)
    }

    /// Shift a comment count after the comment service confirmed the change.
    /// Returns the new count, or `None` if `target` is not in the feed.
    pub fn adjust_comment_count(&self, target: CompositeId, delta: i64) -> Option<u32> {
        let count = self
            .store
            .update(|state| {
                let count = mutator::adjust_comment_count(&mut state.items, target, delta)?;
                state.record_edit(target);
                Some(count)
            })?;
        debug!("{}: comment count of {target} -> {count}", self.name);
        Some(count)
    }

    pub async fn add_comment(
        &self,
        comments: &dyn CommentService,
        target: CompositeId,
        body: &str,
    ) -> Result<Comment, FeedError> {
        let comment = comments
            .add_comment(target, body)
            .await
            .map_err(|e| FeedError::Comment(e.to_string()))?;
        self.adjust_comment_count(target, 1);
        Ok(comment)
    }

    pub async fn delete_comment(
        &self,
        comments: &dyn CommentService,
        target: CompositeId,
        comment_id: u64,
    ) -> Result<(), FeedError> {
        comments
            .delete_comment(target, comment_id)
            .await
            .map_err(|e| FeedError::Comment(e.to_string()))?;
        self.adjust_comment_count(target, -1);
        Ok(())
    }

    // ====================================================================
    // Fetch pipeline
    // ====================================================================

    /// Admit `trigger` against the current phase and, if admitted, mark the
    /// feed loading and capture a ticket.
    fn begin(&self, trigger: Trigger) -> Option<FetchTicket> {
        let ticket = self.store.update(|state| {
            if !state.phase().admits(trigger, state.has_more, state.error.is_some()) {
                return None;
            }
            match trigger {
                Trigger::Refresh(_) => state.reset(),
                Trigger::Retry => state.error = None,
                Trigger::SentinelVisible => {}
            }
            state.loading = true;
            Some(FetchTicket::of(state))
        });

        match (&ticket, trigger) {
            (None, _) => debug!("{}: {trigger:?} ignored", self.name),
            (Some(t), Trigger::Refresh(method)) => info!(
                "{}: {} refresh, generation {}",
                self.name,
                method.as_str(),
                t.generation
            ),
            (Some(t), _) => debug!("{}: {trigger:?} -> page {}", self.name, t.page),
        }
        ticket
    }

    /// Apply a filter edit; if it changed anything, reset and start page 1.
    fn restart(&self, edit: impl FnOnce(&mut FeedState) -> bool) -> Option<FetchTicket> {
        let ticket = self.store.update(|state| {
            if !edit(state) {
                return None;
            }
            state.reset();
            state.loading = true;
            Some(FetchTicket::of(state))
        });
        if let Some(t) = &ticket {
            info!(
                "{}: filters now {} / {} / {}, generation {}",
                self.name,
                t.content,
                t.filter.sort_by,
                t.filter.time_period,
                t.generation
            );
        }
        ticket
    }

    async fn drive(&self, ticket: Option<FetchTicket>) {
        let Some(ticket) = ticket else {
            return;
        };
        let result = self
            .fetcher
            .fetch(&ticket.filter, ticket.content, ticket.page)
            .await;
        self.land(ticket, result);
    }

    /// Publish a fetch result, unless a newer generation has started since.
    fn land(&self, ticket: FetchTicket, result: Result<FetchedPage, FeedError>) {
        let config = self.fetcher.config();
        let landed = self.store.update(|state| {
            if state.generation != ticket.generation {
                return None;
            }
            state.loading = false;
            match result {
                Ok(page) => {
                    let more = has_more(config, ticket.content, &page);
                    let mut fresh: Vec<FeedItem> = page.into_items().collect();
                    mutator::keep_local_counts(&state.items, &mut fresh, |id| {
                        state.edited_since(id, ticket.edit_seq)
                    });
                    // Page 1 lands on the list its reset emptied.
                    state.items = merge_page(&state.items, fresh);
                    state.has_more = more;
                    state.page = ticket.page + 1;
                    state.error = None;
                    Some(Landed::Merged { items: state.items.len(), has_more: more })
                }
                Err(e) => {
                    debug_assert!(e.is_fetch());
                    state.error = Some(e.clone());
                    Some(Landed::Failed(e))
                }
            }
        });

        match landed {
            None => debug!(
                "{}: dropped stale page {} from generation {}",
                self.name, ticket.page, ticket.generation
            ),
            Some(Landed::Merged { items, has_more }) => debug!(
                "{}: page {} merged, {items} items, has_more={has_more}",
                self.name, ticket.page
            ),
            Some(Landed::Failed(e)) => warn!("{}: page {} failed: {e}", self.name, ticket.page),
        }
    }
}
