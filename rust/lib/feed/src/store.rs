use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::state::FeedState;

/// Callback type for state change notifications.
pub type ChangeHandler = Arc<dyn Fn(&FeedState) + Send + Sync>;

/// Unique handle for a subscription, returned by `FeedStore::subscribe()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Holds the current [`FeedState`] of one feed and notifies subscribers.
///
/// - `get()` returns the current snapshot (Arc clone, cheap).
/// - `update(f)` edits a private copy and publishes it with a single swap,
///   so readers see either the old state or the new one, never a half-merged
///   list.
/// - `subscribe(handler)` registers a change handler, called after each
///   publish. Handlers see snapshots in publish order even when updates race
///   on several threads; whichever thread is already notifying delivers the
///   others' snapshots too.
pub struct FeedStore {
    current: RwLock<Arc<FeedState>>,
    handlers: RwLock<Vec<(SubscriptionId, ChangeHandler)>>,
    next_id: AtomicU64,
    outbox: Mutex<Outbox>,
}

/// Published snapshots not yet delivered to handlers.
#[derive(Default)]
struct Outbox {
    queue: VecDeque<Arc<FeedState>>,
    draining: bool,
}

impl FeedStore {
    pub fn new(initial: FeedState) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            outbox: Mutex::new(Outbox::default()),
        }
    }

    pub fn get(&self) -> Arc<FeedState> {
        let current = self.current.read().unwrap();
        Arc::clone(&current)
    }

    /// Apply `f` to a copy of the current state.
    ///
    /// If `f` returns `Some`, the copy is published and subscribers are
    /// notified. If it returns `None` the copy is discarded and nothing is
    /// published. The write lock is held while `f` runs, so concurrent
    /// updates are applied one after another.
    pub fn update<R>(&self, f: impl FnOnce(&mut FeedState) -> Option<R>) -> Option<R> {
        let out = {
            let mut current = self.current.write().unwrap();
            let mut next = FeedState::clone(&current);
            let out = f(&mut next)?;
            *current = Arc::new(next);
            // Queued under the write lock: queue order is publish order.
            self.outbox.lock().unwrap().queue.push_back(Arc::clone(&current));
            out
        };
        self.drain();
        Some(out)
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&FeedState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().unwrap().push((id, Arc::new(handler)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.handlers.write().unwrap().retain(|(sid, _)| *sid != id);
    }

    /// Deliver queued snapshots unless another caller is already doing so.
    /// A handler that updates the store lands here re-entrantly and returns
    /// at once; its snapshot is delivered by the outer loop.
    fn drain(&self) {
        {
            let mut outbox = self.outbox.lock().unwrap();
            if outbox.draining {
                return;
            }
            outbox.draining = true;
        }
        loop {
            let next = {
                let mut outbox = self.outbox.lock().unwrap();
                match outbox.queue.pop_front() {
                    Some(state) => state,
                    None => {
                        outbox.draining = false;
                        return;
                    }
                }
            };
            self.notify(&next);
        }
    }

    fn notify(&self, state: &FeedState) {
        // Clone handlers out so a handler may (un)subscribe without deadlocking.
        let handlers: Vec<ChangeHandler> = self
            .handlers
            .read()
            .unwrap()
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in handlers {
            handler(state);
        }
    }
}

impl Default for FeedStore {
    fn default() -> Self {
        Self::new(FeedState::default())
    }
}
