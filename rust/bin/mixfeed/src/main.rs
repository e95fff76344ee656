//! `mixfeed`: walks a community and a friends feed over seeded in-memory
//! sources and logs what a renderer would see.
//!
//! Usage:
//!   mixfeed [-c <config.toml>] [--content all|ratings|posts]
//!           [--sort created_at|likes] [--period 1d|7d|1M|1Y|all]
//!           [--pages N] [--seed N]

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use clap::Parser;
use tracing::{debug, info, warn};

use mixfeed::{
    Comment, CommentService, CompositeId, ContentFilter, Creator, FeedConfig, FeedEngine,
    FeedFilter, FeedHub, FeedItem, FeedName, FeedSources, LikeService, LikedItems, MemorySource,
    PostItem, RatingItem, RefreshMethod, RemoteError, SortBy, TimePeriod,
};

/// Mixed-content feed demo.
#[derive(Parser, Debug)]
#[command(name = "mixfeed", about = "Mixed-content feed demo")]
struct Cli {
    /// Path to a feed config file. Defaults apply when it doesn't exist.
    #[arg(short = 'c', long = "config", default_value = "mixfeed.toml")]
    config: PathBuf,

    /// Content filter applied after the first page.
    #[arg(long, default_value = "all")]
    content: ContentFilter,

    /// Sort mode applied after the first page.
    #[arg(long, default_value = "created_at")]
    sort: SortBy,

    /// Time window applied after the first page.
    #[arg(long, default_value = "all")]
    period: TimePeriod,

    /// Pages to scroll through on the community feed.
    #[arg(long, default_value_t = 3)]
    pages: usize,

    /// Items seeded per content kind.
    #[arg(long, default_value_t = 40)]
    seed: u64,
}

const USERS: [&str; 4] = ["ana", "ben", "chloe", "dev"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    info!("Loading configuration from {}", cli.config.display());
    let config = FeedConfig::load(&cli.config)?;

    let (ratings, posts) = seed(cli.seed);
    let likes = Arc::new(DemoLikes::default());
    let comments = DemoComments::default();

    let hub = FeedHub::new(FeedSources::new(Arc::new(ratings), Arc::new(posts)), config)
        .with_like_service(likes.clone());
    hub.set_friends(["ana", "chloe"]);

    // Community: initial load, infinite scroll, pull to refresh.
    let community = hub.switch_to(FeedName::Community);
    community.subscribe(|state| {
        debug!(
            "publish: {} items, loading={}, generation={}",
            state.items.len(),
            state.loading,
            state.generation
        );
    });

    community.activate().await;
    render(&community);

    for _ in 1..cli.pages {
        if !community.has_more() {
            break;
        }
        community.on_scroll_near_end().await;
        render(&community);
    }

    community.pull_start(true);
    for raw in [40.0, 120.0, 260.0] {
        info!("pull raw={raw} offset={:.1}", community.pull_move(raw));
    }
    if community.pull_release().await {
        render(&community);
    }

    // Like and comment on the top entry.
    if let Some(top) = community.items().first().map(FeedItem::composite_id) {
        let liked = community.toggle_like(top, &likes.snapshot());
        info!("{top} liked={liked:?}");
        tokio::task::yield_now().await;

        let comment = community.add_comment(&comments, top, "looks great").await?;
        info!("{top} comment #{} added", comment.id);
        render(&community);
    }

    // Filter overrides from the command line.
    community
        .on_filter_change(FeedFilter::new(cli.sort, cli.period))
        .await;
    community.on_content_filter_change(cli.content).await;
    render(&community);

    if let Some(e) = community.error() {
        warn!("community feed error: {e}");
        community.retry().await;
    }

    // Friends tab.
    let friends = hub.switch_to(FeedName::Friends);
    friends.on_refresh(RefreshMethod::Initial).await;
    render(&friends);

    hub.deactivate();
    Ok(())
}

fn render(engine: &FeedEngine) {
    let state = engine.state();
    info!(
        "[{}] {} items, page={}, has_more={}, filter={}/{}/{}",
        engine.name().path(),
        state.items.len(),
        state.page,
        state.has_more,
        state.content_filter,
        state.filter.sort_by,
        state.filter.time_period,
    );
    for item in state.items.iter().take(5) {
        info!(
            "  {:<10} {} by {:<6} likes={} comments={}",
            item.composite_id().to_string(),
            item.created_at().format("%Y-%m-%d %H:%M"),
            item.creator().username,
            item.like_count(),
            item.comment_count(),
        );
    }
}

/// Deterministic ratings and posts spread over the last ~two months.
fn seed(per_kind: u64) -> (MemorySource, MemorySource) {
    let now = Utc::now();
    let creator = |i: u64| {
        let name = USERS[(i % USERS.len() as u64) as usize];
        Creator::new(name, name)
    };

    let ratings = (1..=per_kind).map(|i| {
        FeedItem::Rating(RatingItem {
            id: i,
            creator: creator(i),
            created_at: now - Duration::hours((i * 29) as i64),
            like_count: ((i * 7) % 13) as u32,
            comment_count: (i % 4) as u32,
            quality: (i % 5 + 1) as u8,
            price: ((i + 2) % 5 + 1) as u8,
            comment: Some(format!("rating #{i}")),
            image: None,
            location: None,
        })
    });
    let posts = (1..=per_kind).map(|i| {
        FeedItem::Post(PostItem {
            id: i,
            creator: creator(i + 1),
            created_at: now - Duration::hours((i * 37 + 5) as i64),
            like_count: ((i * 5) % 11) as u32,
            comment_count: (i % 3) as u32,
            title: format!("post #{i}"),
            body: String::new(),
            locations: Vec::new(),
            is_announcement: i % 10 == 0,
        })
    });

    (MemorySource::ratings(ratings), MemorySource::posts(posts))
}

/// Keeps the viewer's liked sets in memory.
#[derive(Default)]
struct DemoLikes {
    liked: Mutex<LikedItems>,
}

impl DemoLikes {
    fn snapshot(&self) -> LikedItems {
        self.liked.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LikeService for DemoLikes {
    async fn toggle_like(&self, target: CompositeId) -> Result<(), RemoteError> {
        let now_liked = self.liked.lock().unwrap().toggle(target);
        debug!("like service: {target} -> {now_liked}");
        Ok(())
    }
}

#[derive(Default)]
struct DemoComments {
    next_id: AtomicU64,
}

#[async_trait::async_trait]
impl CommentService for DemoComments {
    async fn add_comment(&self, target: CompositeId, body: &str) -> Result<Comment, RemoteError> {
        if body.trim().is_empty() {
            return Err(RemoteError::new("empty comment"));
        }
        Ok(Comment {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            target,
            author: Creator::new("viewer", "viewer"),
            body: body.to_string(),
            created_at: Utc::now(),
        })
    }

    async fn delete_comment(&self, _target: CompositeId, _comment_id: u64) -> Result<(), RemoteError> {
        Ok(())
    }
}
