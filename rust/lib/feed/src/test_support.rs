//! Fixtures and scripted collaborators shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::oneshot;

use crate::error::RemoteError;
use crate::model::{Comment, CompositeId, Creator, FeedItem, ItemId, PostItem, RatingItem};
use crate::source::{CommentService, ContentSource, LikeService, PageQuery};

// ========================================================================
// Items
// ========================================================================

/// 2024-01-`day` `hour`:00 UTC.
pub fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
}

fn creator(id: ItemId) -> Creator {
    Creator::new(format!("u{id}"), format!("user{id}"))
}

pub fn rating(id: ItemId, at: DateTime<Utc>) -> FeedItem {
    FeedItem::Rating(RatingItem {
        id,
        creator: creator(id),
        created_at: at,
        like_count: 0,
        comment_count: 0,
        quality: 4,
        price: 2,
        comment: None,
        image: None,
        location: None,
    })
}

pub fn post(id: ItemId, at: DateTime<Utc>) -> FeedItem {
    FeedItem::Post(PostItem {
        id,
        creator: creator(id),
        created_at: at,
        like_count: 0,
        comment_count: 0,
        title: format!("post {id}"),
        body: String::new(),
        locations: Vec::new(),
        is_announcement: false,
    })
}

pub fn with_likes(mut item: FeedItem, n: u32) -> FeedItem {
    *item.like_count_mut() = n;
    item
}

pub fn with_comments(mut item: FeedItem, n: u32) -> FeedItem {
    *item.comment_count_mut() = n;
    item
}

/// Re-attribute `item` to the creator with id `creator_id`.
pub fn by(mut item: FeedItem, creator_id: &str) -> FeedItem {
    let creator = Creator::new(creator_id, creator_id);
    match &mut item {
        FeedItem::Rating(r) => r.creator = creator,
        FeedItem::Post(p) => p.creator = creator,
    }
    item
}

async fn wait_until(done: impl Fn() -> bool) {
    while !done() {
        tokio::task::yield_now().await;
    }
}

// ========================================================================
// ScriptedSource
// ========================================================================

/// Answers calls from a FIFO script, then with empty pages. Records queries.
#[derive(Default)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<Vec<FeedItem>, RemoteError>>>,
    queries: Mutex<Vec<PageQuery>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, items: Vec<FeedItem>) {
        self.script.lock().unwrap().push_back(Ok(items));
    }

    pub fn push_err(&self, msg: &str) {
        self.script.lock().unwrap().push_back(Err(RemoteError::new(msg)));
    }

    pub fn queries(&self) -> Vec<PageQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ContentSource for ScriptedSource {
    async fn fetch(&self, query: &PageQuery) -> Result<Vec<FeedItem>, RemoteError> {
        self.queries.lock().unwrap().push(query.clone());
        self.script.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

// ========================================================================
// GatedSource
// ========================================================================

type Reply = oneshot::Sender<Result<Vec<FeedItem>, RemoteError>>;

/// Parks every call until the test answers it, so tests control the order
/// in which concurrent fetches resolve.
#[derive(Default)]
pub struct GatedSource {
    pending: Mutex<VecDeque<(PageQuery, Reply)>>,
    calls: AtomicUsize,
}

impl GatedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls received so far, answered or not.
    pub fn total_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn wait_for_calls(&self, n: usize) {
        wait_until(|| self.total_calls() >= n).await;
    }

    /// Wait for the oldest parked call and answer it. Returns its query.
    pub async fn reply_ok(&self, items: Vec<FeedItem>) -> PageQuery {
        wait_until(|| !self.pending.lock().unwrap().is_empty()).await;
        self.answer(0, Ok(items))
    }

    /// Answer the `n`-th currently parked call (0 = oldest).
    pub fn reply_nth_ok(&self, n: usize, items: Vec<FeedItem>) -> PageQuery {
        self.answer(n, Ok(items))
    }

    pub fn reply_nth_err(&self, n: usize, msg: &str) -> PageQuery {
        self.answer(n, Err(RemoteError::new(msg)))
    }

    fn answer(&self, n: usize, result: Result<Vec<FeedItem>, RemoteError>) -> PageQuery {
        let (query, tx) = self
            .pending
            .lock()
            .unwrap()
            .remove(n)
            .expect("no parked call at that position");
        // The receiver is gone if the fetch was dropped; nothing to deliver.
        let _ = tx.send(result);
        query
    }
}

#[async_trait::async_trait]
impl ContentSource for GatedSource {
    async fn fetch(&self, query: &PageQuery) -> Result<Vec<FeedItem>, RemoteError> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push_back((query.clone(), tx));
        self.calls.fetch_add(1, Ordering::SeqCst);
        rx.await.unwrap_or_else(|_| Err(RemoteError::new("gate dropped")))
    }
}

// ========================================================================
// Likes and comments
// ========================================================================

#[derive(Default)]
pub struct RecordingLikes {
    calls: Mutex<Vec<CompositeId>>,
    fail: bool,
}

impl RecordingLikes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn calls(&self) -> Vec<CompositeId> {
        self.calls.lock().unwrap().clone()
    }

    pub async fn wait_for_calls(&self, n: usize) {
        wait_until(|| self.calls.lock().unwrap().len() >= n).await;
    }
}

#[async_trait::async_trait]
impl LikeService for RecordingLikes {
    async fn toggle_like(&self, target: CompositeId) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(target);
        if self.fail {
            return Err(RemoteError::new("like rejected"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingComments {
    next_id: AtomicUsize,
    fail: bool,
}

impl RecordingComments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }
}

#[async_trait::async_trait]
impl CommentService for RecordingComments {
    async fn add_comment(&self, target: CompositeId, body: &str) -> Result<Comment, RemoteError> {
        if self.fail {
            return Err(RemoteError::new("comment rejected"));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as u64 + 1;
        Ok(Comment {
            id,
            target,
            author: Creator::new("me", "me"),
            body: body.to_string(),
            created_at: ts(15, 12),
        })
    }

    async fn delete_comment(&self, _target: CompositeId, _comment_id: u64) -> Result<(), RemoteError> {
        if self.fail {
            return Err(RemoteError::new("comment rejected"));
        }
        Ok(())
    }
}
