//! Error types for registry operations.

use kronos_core::ConfigError;
use thiserror::Error;

/// Errors that can occur during registry operations.
///
/// Variants fall into three classes: authentication failures (no usable
/// credential), transport failures (the registry could not be reached or
/// answered with a non-success status), and invalid version data
/// ([`RegistryError::Config`]).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No usable credential could be obtained, or the registry rejected it.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Error message.
        message: String,
    },

    /// Failed to connect to the registry.
    #[error("Failed to connect to registry at {url}: {source}")]
    ConnectionFailed {
        /// Registry URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status from the registry.
    #[error("HTTP error from registry: {status} - {message}")]
    HttpError {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// The registry answered with a body that could not be decoded.
    #[error("Invalid response from registry: {message}")]
    InvalidResponse {
        /// Error message.
        message: String,
    },

    /// Invalid URL.
    #[error("Invalid URL: {url}")]
    InvalidUrl {
        /// URL string.
        url: String,
    },

    /// A listed version carries data the retention engine cannot accept.
    #[error("Invalid version data: {0}")]
    Config(#[from] ConfigError),
}

impl RegistryError {
    /// Returns true for credential failures.
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }

    /// Returns true for malformed version data.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true for failures talking to the registry.
    #[must_use]
    pub const fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::HttpError { .. } | Self::InvalidResponse { .. }
        )
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::ConnectionFailed {
                url: err
                    .url()
                    .map_or_else(|| "unknown".to_string(), ToString::to_string),
                source: err,
            }
        } else if err.is_decode() {
            Self::InvalidResponse {
                message: err.to_string(),
            }
        } else {
            Self::HttpError {
                status: err.status().map_or(0, |s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse {
            message: err.to_string(),
        }
    }
}
