//! TweetScout Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout TweetScout:
//! - Search domain types (queries, results, credentials, recent entries)
//! - Transport and persistence trait abstractions
//! - Core error types

pub mod error;
pub mod store;
pub mod transport;
pub mod types;

pub use error::{Error, Result};
pub use store::{ACCESS_TOKEN_KEY, CredentialStore, PersistenceBackend, RECENT_SEARCHES_KEY};
pub use transport::{GetRequest, PostRequest, Transport, TransportResponse};
pub use types::{
    BearerCredential, RecentSearchEntry, SearchQuery, SearchResult, DEFAULT_SEARCH_LIMIT,
    sanitize_query,
};
