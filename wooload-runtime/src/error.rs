//! Runtime error types

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use wooload_core::{FormError, ValidationError};
use wooload_http::HttpError;

/// Why an iteration stopped early
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("{group}: status code was {status}, not 2xx ({url})")]
    UnexpectedStatus {
        group: &'static str,
        url: String,
        status: u16,
    },

    #[error("{group}: login for '{username}' was rejected, page still has the login form")]
    LoginRejected {
        group: &'static str,
        username: String,
    },

    #[error("{group}: session lost, {url} shows the login form")]
    SessionLost { group: &'static str, url: String },

    #[error("{group}: {source}")]
    Http {
        group: &'static str,
        #[source]
        source: HttpError,
    },

    #[error("{group}: {source}")]
    Form {
        group: &'static str,
        #[source]
        source: FormError,
    },
}

impl FlowError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FlowError::UnexpectedStatus { .. } => FailureKind::Status,
            FlowError::LoginRejected { .. } => FailureKind::LoginRejected,
            FlowError::SessionLost { .. } => FailureKind::SessionLost,
            FlowError::Http { .. } => FailureKind::Transport,
            FlowError::Form { .. } => FailureKind::Form,
        }
    }

    pub fn group(&self) -> &'static str {
        match self {
            FlowError::UnexpectedStatus { group, .. }
            | FlowError::LoginRejected { group, .. }
            | FlowError::SessionLost { group, .. }
            | FlowError::Http { group, .. }
            | FlowError::Form { group, .. } => *group,
        }
    }
}

/// Failure classes reported separately in the run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Status,
    LoginRejected,
    SessionLost,
    Transport,
    Form,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Status => "status",
            FailureKind::LoginRejected => "login_rejected",
            FailureKind::SessionLost => "session_lost",
            FailureKind::Transport => "transport",
            FailureKind::Form => "form",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that prevent a run from starting or completing
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("HTTP client error: {0}")]
    Http(#[from] HttpError),

    #[error("Run output error: {0}")]
    Output(#[from] serde_json::Error),
}
