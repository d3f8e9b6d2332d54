//! Error types for TweetScout Core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Token endpoint rejected the key pair, or a renewed credential was still refused
    #[error("Authentication failed{}: {message}", status_code.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Auth {
        status_code: Option<u16>,
        message: String,
    },

    /// Any non-401 failure of the search endpoint
    #[error("Search failed{}: {message}", status_code.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Search {
        status_code: Option<u16>,
        message: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Network-level failure reported by a `Transport`
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn auth(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Error::Auth {
            status_code,
            message: message.into(),
        }
    }

    pub fn search(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Error::Search {
            status_code,
            message: message.into(),
        }
    }

    /// True for failures that a fresh credential will not fix on its own
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth { .. })
    }

    /// HTTP status code attached to the failure, if the server answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Auth { status_code, .. } | Error::Search { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
