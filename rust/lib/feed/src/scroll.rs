//! Fetch triggering: the Idle/Fetching phase machine and pull-to-refresh
//! gesture physics.
//!
//! Both halves are framework-free. The phase is derived from the feed's
//! `loading` flag, which is the only guard against overlapping fetches.
//! The gesture maps raw drag deltas to a damped offset and decides at
//! release whether a refresh fires.

use crate::config::PullConfig;

/// How a reset-to-page-1 was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshMethod {
    /// Feed view became active.
    Initial,
    /// Explicit refresh action.
    Manual,
    /// Pull gesture released past the threshold.
    Pull,
}

impl RefreshMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            RefreshMethod::Initial => "initial",
            RefreshMethod::Manual => "manual",
            RefreshMethod::Pull => "pull",
        }
    }
}

/// An event that may start a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The end-of-list sentinel became visible.
    SentinelVisible,
    /// Reset to page 1 (also used for filter changes).
    Refresh(RefreshMethod),
    /// User asked to re-request the page that failed.
    Retry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollPhase {
    #[default]
    Idle,
    Fetching,
}

impl ScrollPhase {
    pub fn from_loading(loading: bool) -> Self {
        if loading {
            ScrollPhase::Fetching
        } else {
            ScrollPhase::Idle
        }
    }

    /// Whether `trigger` starts a fetch from this phase.
    ///
    /// Refreshes always start one and supersede whatever is in flight. The
    /// sentinel only paginates from Idle while more data exists and no
    /// failure is pending, so a failed page is never retried behind the
    /// user's back.
    pub fn admits(self, trigger: Trigger, has_more: bool, has_error: bool) -> bool {
        match (self, trigger) {
            (_, Trigger::Refresh(_)) => true,
            (ScrollPhase::Fetching, _) => false,
            (ScrollPhase::Idle, Trigger::SentinelVisible) => has_more && !has_error,
            (ScrollPhase::Idle, Trigger::Retry) => has_error,
        }
    }
}

// ── Pull gesture ────────────────────────────────────────────────────

/// Sub-linear visual response to a drag: `raw^exponent`, 0 for non-positive input.
pub fn damp(raw: f64, exponent: f64) -> f64 {
    if raw <= 0.0 {
        0.0
    } else {
        raw.powf(exponent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    Refresh,
    Cancel,
}

/// Tracks one pull gesture from touch-down to release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PullGesture {
    config: PullConfig,
    tracking: bool,
    distance: f64,
}

impl PullGesture {
    pub fn new(config: PullConfig) -> Self {
        Self {
            config,
            tracking: false,
            distance: 0.0,
        }
    }

    /// Touch-down. A pull is only tracked when the list is scrolled to the top.
    pub fn start(&mut self, at_top: bool) {
        self.tracking = at_top;
        self.distance = 0.0;
    }

    /// Drag update with the raw distance from the touch-down point.
    /// Returns the visual offset to render.
    pub fn update(&mut self, raw_delta: f64) -> f64 {
        if !self.tracking {
            return 0.0;
        }
        self.distance = damp(raw_delta, self.config.damping_exponent);
        self.offset()
    }

    /// Current visual offset, capped at `max_offset`.
    pub fn offset(&self) -> f64 {
        self.distance.min(self.config.max_offset)
    }

    /// Damped pull distance before the visual cap.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Touch-up. Compares the damped distance against the threshold and
    /// resets the gesture.
    pub fn release(&mut self) -> PullOutcome {
        let outcome = if self.tracking && self.distance >= self.config.threshold {
            PullOutcome::Refresh
        } else {
            PullOutcome::Cancel
        };
        self.tracking = false;
        self.distance = 0.0;
        outcome
    }
}
