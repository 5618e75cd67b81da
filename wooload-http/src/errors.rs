//! HTTP error types

use crate::types::HttpMethod;

/// Error type for HTTP operations
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Network error during {method} {url}: {source}")]
    NetworkError {
        method: HttpMethod,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid cookie '{name}': {reason}")]
    InvalidCookie { name: String, reason: String },
}

impl HttpError {
    /// Whether the request timed out rather than failing outright
    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::NetworkError { source, .. } if source.is_timeout())
    }
}
