//! Error types for Kronos core operations.
//!
//! The retention engine itself cannot fail on a sound input list. Everything
//! that can go wrong happens while turning user-supplied parameters into a
//! [`RetentionPolicy`](crate::RetentionPolicy), and is reported as a
//! [`ConfigError`] before any registry traffic takes place.

use thiserror::Error;

/// Result type alias using [`ConfigError`] as the error type.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Invalid retention policy parameters.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The keep-tag pattern is not a valid regular expression.
    #[error("Invalid keep pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern as supplied by the caller.
        pattern: String,
        /// Underlying regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// The maximum age is negative or does not fit a duration.
    #[error("Invalid maximum age: {seconds} seconds")]
    InvalidMaxAge {
        /// The rejected value, in seconds.
        seconds: i64,
    },

    /// A timestamp could not be parsed.
    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp {
        /// The raw timestamp string.
        value: String,
        /// Reason for the parse failure.
        reason: String,
    },
}
