//! Feed entries: the two content variants and their shared identity.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numeric id assigned by a content source. Only unique within one kind.
pub type ItemId = u64;

/// Variant tag of a feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Rating,
    Post,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Rating => "rating",
            ContentKind::Post => "post",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(kind, id)`, the dedup and mutation key of a feed entry.
///
/// A rating and a post with the same numeric id are different entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompositeId {
    pub kind: ContentKind,
    pub id: ItemId,
}

impl CompositeId {
    pub fn new(kind: ContentKind, id: ItemId) -> Self {
        Self { kind, id }
    }

    pub fn rating(id: ItemId) -> Self {
        Self::new(ContentKind::Rating, id)
    }

    pub fn post(id: ItemId) -> Self {
        Self::new(ContentKind::Post, id)
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Author of an entry, as referenced by the content source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Creator {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            avatar: None,
        }
    }
}

/// A place a rating or post is attached to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingItem {
    pub id: ItemId,
    pub creator: Creator,
    pub created_at: DateTime<Utc>,
    pub like_count: u32,
    pub comment_count: u32,
    /// Quality score, 1..=5.
    pub quality: u8,
    /// Price score, 1..=5.
    pub price: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostItem {
    pub id: ItemId,
    pub creator: Creator,
    pub created_at: DateTime<Utc>,
    pub like_count: u32,
    pub comment_count: u32,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub is_announcement: bool,
}

/// A single entry rendered in a feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedItem {
    Rating(RatingItem),
    Post(PostItem),
}

impl FeedItem {
    pub fn kind(&self) -> ContentKind {
        match self {
            FeedItem::Rating(_) => ContentKind::Rating,
            FeedItem::Post(_) => ContentKind::Post,
        }
    }

    pub fn id(&self) -> ItemId {
        match self {
            FeedItem::Rating(r) => r.id,
            FeedItem::Post(p) => p.id,
        }
    }

    pub fn composite_id(&self) -> CompositeId {
        CompositeId::new(self.kind(), self.id())
    }

    pub fn creator(&self) -> &Creator {
        match self {
            FeedItem::Rating(r) => &r.creator,
            FeedItem::Post(p) => &p.creator,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            FeedItem::Rating(r) => r.created_at,
            FeedItem::Post(p) => p.created_at,
        }
    }

    pub fn like_count(&self) -> u32 {
        match self {
            FeedItem::Rating(r) => r.like_count,
            FeedItem::Post(p) => p.like_count,
        }
    }

    pub fn comment_count(&self) -> u32 {
        match self {
            FeedItem::Rating(r) => r.comment_count,
            FeedItem::Post(p) => p.comment_count,
        }
    }

    pub(crate) fn like_count_mut(&mut self) -> &mut u32 {
        match self {
            FeedItem::Rating(r) => &mut r.like_count,
            FeedItem::Post(p) => &mut p.like_count,
        }
    }

    pub(crate) fn comment_count_mut(&mut self) -> &mut u32 {
        match self {
            FeedItem::Rating(r) => &mut r.comment_count,
            FeedItem::Post(p) => &mut p.comment_count,
        }
    }
}

/// A comment returned by the comment service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub target: CompositeId,
    pub author: Creator,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
