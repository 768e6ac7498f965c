//! Tag matching.
//!
//! The engine only needs to ask "does this tag match?". [`TagMatcher`] is
//! that capability; [`KeepPattern`] is the regular-expression backed
//! implementation used by the command line.

use regex::Regex;

use crate::error::{ConfigError, Result};

/// Default keep-tag pattern: tags prefixed `latest-` or `git-tag-`.
pub const DEFAULT_KEEP_PATTERN: &str = "^(latest-|git-tag-)";

/// Predicate deciding whether a tag matches.
pub trait TagMatcher {
    /// Returns true if `tag` matches.
    fn matches(&self, tag: &str) -> bool;
}

impl<F> TagMatcher for F
where
    F: Fn(&str) -> bool,
{
    fn matches(&self, tag: &str) -> bool {
        self(tag)
    }
}

/// A compiled keep-tag regular expression.
///
/// Matching is a search, not a full match: the pattern is not implicitly
/// anchored, so `latest` matches the tag `my-latest-build`.
///
/// # Examples
///
/// ```rust
/// use kronos_core::{KeepPattern, TagMatcher};
///
/// let pattern = KeepPattern::new("^(latest-|git-tag-)").unwrap();
/// assert!(pattern.matches("git-tag-v1.2.0"));
/// assert!(!pattern.matches("git-commit-abc1234"));
///
/// assert!(KeepPattern::new("(unclosed").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct KeepPattern {
    regex: Regex,
}

impl KeepPattern {
    /// Compiles a keep pattern.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(|regex| Self { regex })
            .map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Returns the source pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Default for KeepPattern {
    fn default() -> Self {
        Self {
            regex: Regex::new(DEFAULT_KEEP_PATTERN).expect("default keep pattern is valid"),
        }
    }
}

impl TagMatcher for KeepPattern {
    fn matches(&self, tag: &str) -> bool {
        self.regex.is_match(tag)
    }
}

/// Returns true for build-provenance tags of the form `git-commit-<sha>`.
///
/// Such a tag on its own is not a release tag.
#[must_use]
pub fn is_git_commit_tag(tag: &str) -> bool {
    tag.starts_with("git-commit-")
}
