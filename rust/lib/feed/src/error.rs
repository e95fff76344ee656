use thiserror::Error;

use crate::model::ContentKind;

/// Error reported by an external collaborator (content source, like or
/// comment service). Carried as an opaque message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct RemoteError(pub String);

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// One of the page's source calls failed. Nothing from the page is merged.
    #[error("failed to fetch {kind}s: {source}")]
    Fetch {
        kind: ContentKind,
        source: RemoteError,
    },

    #[error("invalid feed config: {0}")]
    Config(String),

    #[error("comment service: {0}")]
    Comment(String),

    #[error("unknown {what}: {value}")]
    Parse { what: &'static str, value: String },
}

impl FeedError {
    /// True for failures that belong in the feed's visible `error` field.
    pub fn is_fetch(&self) -> bool {
        matches!(self, FeedError::Fetch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_message_names_the_source() {
        let err = FeedError::Fetch {
            kind: ContentKind::Post,
            source: RemoteError::new("connection reset"),
        };
        assert_eq!(err.to_string(), "failed to fetch posts: connection reset");
        assert!(err.is_fetch());
    }

    #[test]
    fn fetch_error_exposes_remote_source() {
        use std::error::Error as _;

        let err = FeedError::Fetch {
            kind: ContentKind::Rating,
            source: RemoteError::new("timeout"),
        };
        assert_eq!(err.source().map(|s| s.to_string()), Some("timeout".into()));
    }

    #[test]
    fn parse_error_message() {
        let err = FeedError::Parse { what: "sort mode", value: "hot".into() };
        assert_eq!(err.to_string(), "unknown sort mode: hot");
        assert!(!err.is_fetch());
    }
}
