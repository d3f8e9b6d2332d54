//! Persistence trait definitions
//!
//! Two narrow views over a key/value backend:
//! - `CredentialStore` holds plain string values (the cached bearer token)
//! - `PersistenceBackend` holds arbitrary JSON documents (the recent searches)
//!
//! Implementations:
//! - `JsonFileStore`: one JSON document on disk, rewritten on every mutation
//! - `MemoryStore`: process-local map, used by tests and ephemeral sessions

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// Key under which the bearer token is cached
pub const ACCESS_TOKEN_KEY: &str = "TWITTER_ACCESS_TOKEN";

/// Key under which the recent-search list is persisted
pub const RECENT_SEARCHES_KEY: &str = "TWITTER_RECENT_SEARCHES";

/// String-valued store used to cache credentials
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Get the value stored under `key`
    ///
    /// Returns `Ok(None)` when nothing is stored or the stored value is not a string.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value stored under `key`; removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}

/// JSON-valued store used for application state
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Load the document stored under `key`
    async fn load(&self, key: &str) -> Result<Option<Value>>;

    /// Save `value` under `key`, replacing any previous document
    async fn save(&self, key: &str, value: Value) -> Result<()>;
}
