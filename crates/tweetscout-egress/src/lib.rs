//! TweetScout Egress
//!
//! This crate talks to the remote search service:
//! - reqwest-backed `Transport`
//! - OAuth2 client-credentials token endpoint
//! - Authenticated search client with single renewal on 401

pub mod client;
pub mod oauth;
pub mod twitter;

pub use client::{HttpClientConfig, ReqwestTransport, create_client};
pub use oauth::{TokenResponse, request_bearer_token};
pub use twitter::{AuthenticatedSearchClient, TwitterConfig};

use thiserror::Error;

/// HTTP-layer failures inside this crate
#[derive(Debug, Error)]
pub enum EgressError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Request timeout after {0}s")]
    Timeout(u64),
}

pub type Result<T> = std::result::Result<T, EgressError>;

impl From<EgressError> for tweetscout_core::Error {
    fn from(err: EgressError) -> Self {
        match err {
            EgressError::ConfigError(message) => tweetscout_core::Error::Config(message),
            other => tweetscout_core::Error::Transport(other.to_string()),
        }
    }
}
