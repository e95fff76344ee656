//! Feed tabs: builds the community and friends engines from shared
//! collaborators and keeps track of which one is on screen.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use tracing::info;

use crate::config::FeedConfig;
use crate::engine::FeedEngine;
use crate::filter::Audience;
use crate::source::{FeedSources, LikeService, NoopLikes};
use crate::state::FeedName;

/// Owns the collaborators both feeds share and hands out engines.
///
/// Each [`switch_to`](Self::switch_to) builds a fresh engine, so a tab that
/// is re-entered starts from page 1 with its own state. The previously
/// active engine is released; a fetch it still has in flight lands on that
/// engine only and never touches the new one.
pub struct FeedHub {
    sources: FeedSources,
    config: FeedConfig,
    likes: Arc<dyn LikeService>,
    friends: RwLock<Arc<HashSet<String>>>,
    active: RwLock<Option<Arc<FeedEngine>>>,
}

impl FeedHub {
    pub fn new(sources: FeedSources, config: FeedConfig) -> Self {
        Self {
            sources,
            config,
            likes: Arc::new(NoopLikes),
            friends: RwLock::new(Arc::new(HashSet::new())),
            active: RwLock::new(None),
        }
    }

    pub fn with_like_service(mut self, likes: Arc<dyn LikeService>) -> Self {
        self.likes = likes;
        self
    }

    /// Replace the viewer's friend ids. Applies to friends engines built
    /// from now on.
    pub fn set_friends<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: HashSet<String> = ids.into_iter().map(Into::into).collect();
        *self.friends.write().unwrap() = Arc::new(ids);
    }

    pub fn audience(&self, name: FeedName) -> Audience {
        match name {
            FeedName::Community => Audience::Everyone,
            FeedName::Friends => Audience::Friends(Arc::clone(&self.friends.read().unwrap())),
        }
    }

    /// A new, inactive engine for `name`.
    pub fn build(&self, name: FeedName) -> FeedEngine {
        FeedEngine::new(name, self.sources.clone(), self.audience(name), self.config.clone())
            .with_like_service(Arc::clone(&self.likes))
    }

    /// Make `name` the active feed. The caller still has to
    /// [`activate`](FeedEngine::activate) it to load page 1.
    pub fn switch_to(&self, name: FeedName) -> Arc<FeedEngine> {
        let engine = Arc::new(self.build(name));
        let previous = self.active.write().unwrap().replace(Arc::clone(&engine));
        match previous {
            Some(prev) => info!("feed switched {} -> {name}", prev.name()),
            None => info!("feed {name} active"),
        }
        engine
    }

    pub fn active(&self) -> Option<Arc<FeedEngine>> {
        self.active.read().unwrap().clone()
    }

    pub fn deactivate(&self) -> Option<Arc<FeedEngine>> {
        let previous = self.active.write().unwrap().take();
        if let Some(prev) = &previous {
            info!("feed {} inactive", prev.name());
        }
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySource;
    use crate::model::FeedItem;
    use crate::test_support::{by, post, rating, ts, ScriptedSource};

    fn hub() -> FeedHub {
        let ratings = MemorySource::ratings([
            by(rating(1, ts(3, 0)), "alice"),
            by(rating(2, ts(2, 0)), "bob"),
        ]);
        let posts = MemorySource::posts([by(post(1, ts(1, 0)), "alice")]);
        FeedHub::new(
            FeedSources::new(Arc::new(ratings), Arc::new(posts)),
            FeedConfig::default(),
        )
    }

    fn creators(items: &[FeedItem]) -> Vec<String> {
        items.iter().map(|i| i.creator().id.clone()).collect()
    }

    #[tokio::test]
    async fn community_sees_everyone() {
        let hub = hub();
        let engine = hub.switch_to(FeedName::Community);
        engine.activate().await;
        assert_eq!(creators(&engine.items()), vec!["alice", "bob", "alice"]);
    }

    #[tokio::test]
    async fn friends_sees_only_friends() {
        let hub = hub();
        hub.set_friends(["alice"]);
        let engine = hub.switch_to(FeedName::Friends);
        engine.activate().await;
        assert_eq!(creators(&engine.items()), vec!["alice", "alice"]);
        assert_eq!(engine.name(), FeedName::Friends);
    }

    #[tokio::test]
    async fn friends_without_friends_skips_sources() {
        let ratings = Arc::new(ScriptedSource::new());
        let posts = Arc::new(ScriptedSource::new());
        let hub = FeedHub::new(
            FeedSources::new(ratings.clone(), posts.clone()),
            FeedConfig::default(),
        );

        let engine = hub.switch_to(FeedName::Friends);
        engine.activate().await;

        let state = engine.state();
        assert!(state.items.is_empty());
        assert!(!state.has_more);
        assert!(state.error.is_none());
        assert!(ratings.queries().is_empty());
        assert!(posts.queries().is_empty());
    }

    #[tokio::test]
    async fn switching_builds_a_fresh_engine() {
        let hub = hub();
        let first = hub.switch_to(FeedName::Community);
        first.activate().await;

        hub.switch_to(FeedName::Friends);
        let again = hub.switch_to(FeedName::Community);

        assert!(!Arc::ptr_eq(&first, &again));
        assert!(again.items().is_empty());
        assert_eq!(first.items().len(), 3);
        assert!(Arc::ptr_eq(&hub.active().unwrap(), &again));
    }

    #[test]
    fn deactivate_clears_active() {
        let hub = hub();
        assert!(hub.active().is_none());
        hub.switch_to(FeedName::Community);
        let prev = hub.deactivate().unwrap();
        assert_eq!(prev.name(), FeedName::Community);
        assert!(hub.active().is_none());
        assert!(hub.deactivate().is_none());
    }

    #[test]
    fn friends_change_applies_to_next_build() {
        let hub = hub();
        let before = hub.audience(FeedName::Friends);
        hub.set_friends(["bob"]);
        assert!(before.is_empty());
        assert!(!hub.audience(FeedName::Friends).is_empty());
        assert_eq!(hub.audience(FeedName::Community), Audience::Everyone);
    }
}
