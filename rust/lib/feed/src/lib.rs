//! Mixfeed: mixed-content feed aggregation engine.
//!
//! Merges two independently paginated content streams (ratings and posts)
//! into one ordered feed, drives infinite-scroll pagination and
//! pull-to-refresh, and applies optimistic like/comment updates. Storage and
//! querying stay behind the [`ContentSource`] trait; the engine owns only the
//! in-memory [`FeedState`] that a renderer observes.
//!
//! # Pipeline
//!
//! ```text
//! scroll / refresh / filter change
//!         │
//!         ▼
//!   PageFetcher ── ratings ─┐  (concurrent, all-or-nothing)
//!               └─ posts ───┤
//!                           ▼
//!                      merge_page ──► FeedStore (Arc<FeedState>) ──► subscribers
//!                           ▲
//!   OptimisticMutator ──────┘  (like / comment counts, keyed by CompositeId)
//! ```
//!
//! # Generations
//!
//! Every refresh or filter change bumps `FeedState::generation`. A fetch
//! carries the generation it started under; a result that arrives after the
//! generation moved on is dropped silently.
//!
//! # Example
//!
//! ```ignore
//! use mixfeed::{FeedEngine, FeedName, FeedSources, Audience, FeedConfig};
//!
//! let engine = FeedEngine::new(
//!     FeedName::Community,
//!     FeedSources::new(ratings, posts),
//!     Audience::Everyone,
//!     FeedConfig::default(),
//! );
//!
//! engine.subscribe(|state| println!("{} items", state.items.len()));
//! engine.activate().await;
//! engine.on_scroll_near_end().await;
//! ```

pub mod availability;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod hub;
pub mod memory;
pub mod merger;
pub mod model;
pub mod mutator;
pub mod scroll;
pub mod source;
pub mod state;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export primary types at crate root.
pub use config::{FeedConfig, MixedPageSizes, PullConfig};
pub use engine::FeedEngine;
pub use error::{FeedError, RemoteError};
pub use fetcher::{FetchedPage, PageFetcher};
pub use filter::{Audience, ContentFilter, FeedFilter, SortBy, TimePeriod};
pub use hub::FeedHub;
pub use memory::MemorySource;
pub use merger::merge_page;
pub use model::{Comment, CompositeId, ContentKind, Creator, FeedItem, ItemId, Location, PostItem, RatingItem};
pub use mutator::LikedItems;
pub use scroll::{PullGesture, PullOutcome, RefreshMethod, ScrollPhase, Trigger};
pub use source::{CommentService, ContentSource, FeedSources, LikeService, NoopLikes, PageQuery};
pub use state::{FeedName, FeedState};
pub use store::{ChangeHandler, FeedStore, SubscriptionId};
