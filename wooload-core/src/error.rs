//! Core error types

use thiserror::Error;
use wooload_http::HttpError;

/// Precondition failures detected before any request is made
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Site URL is not set (set SITE_URL or site.url)")]
    MissingSiteUrl,

    #[error("Invalid site URL '{url}': {reason}")]
    InvalidSiteUrl { url: String, reason: String },
}

/// A diagnostic footnote was found but could not be read in full
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetricsParseError {
    #[error("Footnote comment is not terminated")]
    Unterminated,

    #[error("Footnote is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Footnote field '{field}' has invalid value '{value}'")]
    InvalidValue { field: &'static str, value: String },
}

/// Login form extraction and submission errors
#[derive(Debug, Error)]
pub enum FormError {
    #[error("No form with class '{0}' found in response")]
    NotFound(String),

    #[error("Form action '{action}' could not be resolved: {source}")]
    InvalidAction {
        action: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Http(#[from] HttpError),
}
