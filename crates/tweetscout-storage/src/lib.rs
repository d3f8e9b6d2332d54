//! TweetScout Storage
//!
//! This crate provides the persistence side of TweetScout:
//! - JSON file store (one document, atomically rewritten on every change)
//! - In-memory store (tests and ephemeral sessions)
//! - Bounded most-recent-first list and the recent-search history built on it

pub mod atomic_writer;
pub mod file_store;
pub mod memory;
pub mod recent;
pub mod traits;

pub use file_store::JsonFileStore;
pub use memory::MemoryStore;
pub use recent::{BoundedRecentList, DEFAULT_RECENT_CAPACITY, PersistenceWarning, RecentSearches};
pub use traits::{StorageError, StorageResult};
