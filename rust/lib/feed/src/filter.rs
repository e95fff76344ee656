//! User-selectable feed filters and the source-selection strategy.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FeedError;
use crate::model::{ContentKind, Creator};

/// Server-side ordering requested from a content source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    CreatedAt,
    Likes,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::CreatedAt => "created_at",
            SortBy::Likes => "likes",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(SortBy::CreatedAt),
            "likes" => Ok(SortBy::Likes),
            other => Err(FeedError::Parse { what: "sort mode", value: other.to_string() }),
        }
    }
}

/// Creation-time window relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimePeriod {
    #[serde(rename = "1d")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "1M")]
    Month,
    #[serde(rename = "1Y")]
    Year,
    #[default]
    #[serde(rename = "all")]
    All,
}

impl TimePeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            TimePeriod::Day => "1d",
            TimePeriod::Week => "7d",
            TimePeriod::Month => "1M",
            TimePeriod::Year => "1Y",
            TimePeriod::All => "all",
        }
    }

    /// Oldest creation time admitted by this window, or `None` for `all`.
    ///
    /// Months and years are calendar-based.
    pub fn since(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimePeriod::Day => Some(now - Duration::days(1)),
            TimePeriod::Week => Some(now - Duration::days(7)),
            TimePeriod::Month => now.checked_sub_months(Months::new(1)),
            TimePeriod::Year => now.checked_sub_months(Months::new(12)),
            TimePeriod::All => None,
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimePeriod {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1d" => Ok(TimePeriod::Day),
            "7d" => Ok(TimePeriod::Week),
            "1M" => Ok(TimePeriod::Month),
            "1Y" => Ok(TimePeriod::Year),
            "all" => Ok(TimePeriod::All),
            other => Err(FeedError::Parse { what: "time period", value: other.to_string() }),
        }
    }
}

/// Which content sources a feed draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFilter {
    #[default]
    All,
    Ratings,
    Posts,
}

impl ContentFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentFilter::All => "all",
            ContentFilter::Ratings => "ratings",
            ContentFilter::Posts => "posts",
        }
    }

    /// Whether the source for `kind` is queried under this filter.
    pub fn includes(self, kind: ContentKind) -> bool {
        match self {
            ContentFilter::All => true,
            ContentFilter::Ratings => kind == ContentKind::Rating,
            ContentFilter::Posts => kind == ContentKind::Post,
        }
    }

    pub fn is_mixed(self) -> bool {
        self == ContentFilter::All
    }
}

impl fmt::Display for ContentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentFilter {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(ContentFilter::All),
            "ratings" => Ok(ContentFilter::Ratings),
            "posts" => Ok(ContentFilter::Posts),
            other => Err(FeedError::Parse { what: "content filter", value: other.to_string() }),
        }
    }
}

/// Sort mode plus time window, passed through to every source call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedFilter {
    pub sort_by: SortBy,
    pub time_period: TimePeriod,
}

impl FeedFilter {
    pub fn new(sort_by: SortBy, time_period: TimePeriod) -> Self {
        Self { sort_by, time_period }
    }
}

/// Whose content a feed shows. The community feed uses `Everyone`; the
/// friends feed restricts sources to the viewer's friends.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Audience {
    #[default]
    Everyone,
    Friends(Arc<HashSet<String>>),
}

impl Audience {
    pub fn friends<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Audience::Friends(Arc::new(ids.into_iter().map(Into::into).collect()))
    }

    pub fn admits(&self, creator: &Creator) -> bool {
        match self {
            Audience::Everyone => true,
            Audience::Friends(ids) => ids.contains(&creator.id),
        }
    }

    /// A friends audience with nobody in it can never yield content.
    pub fn is_empty(&self) -> bool {
        matches!(self, Audience::Friends(ids) if ids.is_empty())
    }
}
