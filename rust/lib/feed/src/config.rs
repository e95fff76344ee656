//! Feed tuning: page sizes and pull-to-refresh physics.
//!
//! Loaded from TOML; every field has a default so an empty file (or no file)
//! yields the stock configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FeedError;
use crate::filter::ContentFilter;
use crate::model::ContentKind;

/// Per-source page sizes used when a feed mixes both kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixedPageSizes {
    pub ratings: usize,
    pub posts: usize,
}

impl Default for MixedPageSizes {
    fn default() -> Self {
        Self { ratings: 7, posts: 3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullConfig {
    /// Damped pull distance at release that triggers a refresh.
    pub threshold: f64,
    /// Exponent applied to the raw drag distance. Must be in (0, 1].
    pub damping_exponent: f64,
    /// Visual offset cap. Does not affect the refresh decision.
    pub max_offset: f64,
}

impl Default for PullConfig {
    fn default() -> Self {
        Self {
            threshold: 80.0,
            damping_exponent: 0.85,
            max_offset: 140.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Page size when only one source is queried.
    pub single_page_size: usize,
    pub mixed: MixedPageSizes,
    pub pull: PullConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            single_page_size: 10,
            mixed: MixedPageSizes::default(),
            pull: PullConfig::default(),
        }
    }
}

impl FeedConfig {
    /// Expected page size for `kind` under `filter`, or `None` if that
    /// source is not queried at all.
    pub fn page_size(&self, filter: ContentFilter, kind: ContentKind) -> Option<usize> {
        if !filter.includes(kind) {
            return None;
        }
        if !filter.is_mixed() {
            return Some(self.single_page_size);
        }
        Some(match kind {
            ContentKind::Rating => self.mixed.ratings,
            ContentKind::Post => self.mixed.posts,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, FeedError> {
        let config: FeedConfig =
            toml::from_str(content).map_err(|e| FeedError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from disk, or return the default if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, FeedError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| FeedError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), FeedError> {
        if self.single_page_size == 0 {
            return Err(FeedError::Config("single_page_size must be positive".into()));
        }
        if self.mixed.ratings == 0 || self.mixed.posts == 0 {
            return Err(FeedError::Config("mixed page sizes must be positive".into()));
        }
        let pull = &self.pull;
        if pull.threshold.is_nan() || pull.threshold <= 0.0 {
            return Err(FeedError::Config("pull.threshold must be positive".into()));
        }
        if pull.damping_exponent.is_nan() || pull.damping_exponent <= 0.0 || pull.damping_exponent > 1.0 {
            return Err(FeedError::Config("pull.damping_exponent must be in (0, 1]".into()));
        }
        if pull.max_offset.is_nan() || pull.max_offset <= 0.0 {
            return Err(FeedError::Config("pull.max_offset must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = FeedConfig::default();
        assert_eq!(config.single_page_size, 10);
        assert_eq!(config.mixed, MixedPageSizes { ratings: 7, posts: 3 });
        assert_eq!(config.pull.damping_exponent, 0.85);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn page_size_mixed_is_asymmetric() {
        let config = FeedConfig::default();
        assert_eq!(config.page_size(ContentFilter::All, ContentKind::Rating), Some(7));
        assert_eq!(config.page_size(ContentFilter::All, ContentKind::Post), Some(3));
    }

    #[test]
    fn page_size_single_type() {
        let config = FeedConfig::default();
        assert_eq!(config.page_size(ContentFilter::Ratings, ContentKind::Rating), Some(10));
        assert_eq!(config.page_size(ContentFilter::Ratings, ContentKind::Post), None);
        assert_eq!(config.page_size(ContentFilter::Posts, ContentKind::Post), Some(10));
        assert_eq!(config.page_size(ContentFilter::Posts, ContentKind::Rating), None);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = FeedConfig::from_toml_str(
            r#"
            [mixed]
            posts = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.mixed.ratings, 7);
        assert_eq!(config.mixed.posts, 5);
        assert_eq!(config.single_page_size, 10);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(FeedConfig::from_toml_str("").unwrap(), FeedConfig::default());
    }

    #[test]
    fn rejects_zero_page_size() {
        let err = FeedConfig::from_toml_str("single_page_size = 0").unwrap_err();
        assert!(matches!(err, FeedError::Config(_)));
    }

    #[test]
    fn rejects_bad_damping() {
        let err = FeedConfig::from_toml_str("[pull]\ndamping_exponent = 1.5").unwrap_err();
        assert!(err.to_string().contains("damping_exponent"));
    }

    #[test]
    fn rejects_nan_pull_values() {
        let mut config = FeedConfig::default();
        config.pull.threshold = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = FeedConfig::default();
        config.pull.damping_exponent = f64::NAN;
        assert!(config.validate().is_err());

        let err = FeedConfig::from_toml_str("[pull]\nmax_offset = nan").unwrap_err();
        assert!(err.to_string().contains("max_offset"));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(FeedConfig::from_toml_str("mixed = [").is_err());
    }

    #[test]
    fn load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = FeedConfig::load(&dir.path().join("feed.toml")).unwrap();
        assert_eq!(config, FeedConfig::default());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.toml");
        std::fs::write(&path, "single_page_size = 20\n[pull]\nthreshold = 60.0\n").unwrap();

        let config = FeedConfig::load(&path).unwrap();
        assert_eq!(config.single_page_size, 20);
        assert_eq!(config.pull.threshold, 60.0);
        assert_eq!(config.pull.max_offset, 140.0);
    }
}
