//! Recent-search history
//!
//! `BoundedRecentList` is a capacity-limited, most-recent-first sequence with
//! value semantics: recording returns a new list instead of mutating a shared
//! one. `RecentSearches` binds such a list to a `PersistenceBackend` key and
//! writes it back after every change.

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use tweetscout_core::{PersistenceBackend, RECENT_SEARCHES_KEY, RecentSearchEntry};

/// Number of searches remembered unless configured otherwise
pub const DEFAULT_RECENT_CAPACITY: usize = 5;

/// Ordered, capacity-bounded list, most recent first
///
/// Insertion order is the only order. Repeated values are kept: recording a
/// value that is already present adds a new head without removing the older
/// occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedRecentList<T> {
    entries: Vec<T>,
    capacity: usize,
}

impl<T: Clone> BoundedRecentList<T> {
    /// Empty list; a capacity of zero is raised to one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// List holding `entries` (most recent first), truncated to `capacity`
    pub fn from_entries(capacity: usize, entries: impl IntoIterator<Item = T>) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: entries.into_iter().take(capacity).collect(),
            capacity,
        }
    }

    /// A new list with `entry` at the head and the oldest entries evicted
    #[must_use]
    pub fn recorded(&self, entry: T) -> Self {
        let mut entries = Vec::with_capacity(self.capacity);
        entries.push(entry);
        entries.extend(self.entries.iter().take(self.capacity - 1).cloned());
        Self {
            entries,
            capacity: self.capacity,
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    /// Most recently recorded entry
    pub fn head(&self) -> Option<&T> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }
}

impl<T: Clone> Default for BoundedRecentList<T> {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_CAPACITY)
    }
}

/// Non-fatal failure to persist the history
///
/// The in-memory list already holds the change when this is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not save recent searches under {key}: {message}")]
pub struct PersistenceWarning {
    pub key: String,
    pub message: String,
}

/// Recent searches persisted under a fixed backend key
pub struct RecentSearches {
    backend: Arc<dyn PersistenceBackend>,
    key: String,
    list: BoundedRecentList<RecentSearchEntry>,
    loaded: bool,
}

impl RecentSearches {
    /// History bound to `TWITTER_RECENT_SEARCHES`, not yet loaded
    pub fn new(backend: Arc<dyn PersistenceBackend>, capacity: usize) -> Self {
        Self {
            backend,
            key: RECENT_SEARCHES_KEY.to_string(),
            list: BoundedRecentList::new(capacity),
            loaded: false,
        }
    }

    /// Use a different backend key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Create and load in one step
    pub async fn open(backend: Arc<dyn PersistenceBackend>, capacity: usize) -> Self {
        let mut recent = Self::new(backend, capacity);
        recent.load().await;
        recent
    }

    /// Read the stored history, replacing the in-memory list
    ///
    /// Never fails: a backend error, a missing key or a value that is not a
    /// list of `{ "search": ... }` objects all yield an empty history.
    pub async fn load(&mut self) -> &[RecentSearchEntry] {
        let capacity = self.list.capacity();
        let entries = match self.backend.load(&self.key).await {
            Ok(Some(value)) => decode_entries(&self.key, value),
            Ok(None) => {
                debug!("No recent searches stored under {}", self.key);
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to load recent searches from {}: {}", self.key, e);
                Vec::new()
            }
        };

        self.list = BoundedRecentList::from_entries(capacity, entries);
        self.loaded = true;
        self.list.as_slice()
    }

    /// Put `search` at the head of the history and persist the result
    ///
    /// Loads first if the history has not been loaded yet, so stored entries
    /// are never overwritten by a fresh list. A failed write is returned as a
    /// warning; the in-memory history keeps the new entry either way.
    pub async fn record(&mut self, search: impl Into<String>) -> Option<PersistenceWarning> {
        if !self.loaded {
            self.load().await;
        }

        self.list = self.list.recorded(RecentSearchEntry::new(search));

        let message = match serde_json::to_value(self.list.as_slice()) {
            Ok(value) => match self.backend.save(&self.key, value).await {
                Ok(()) => {
                    debug!(
                        "Saved {} recent searches under {}",
                        self.list.len(),
                        self.key
                    );
                    return None;
                }
                Err(e) => e.to_string(),
            },
            Err(e) => e.to_string(),
        };

        let warning = PersistenceWarning {
            key: self.key.clone(),
            message,
        };
        warn!("{}", warning);
        Some(warning)
    }

    /// Entry at `index` (0 is the most recent); does not re-promote it
    pub fn select(&self, index: usize) -> Option<&RecentSearchEntry> {
        self.list.get(index)
    }

    pub fn entries(&self) -> &[RecentSearchEntry] {
        self.list.as_slice()
    }

    pub fn list(&self) -> &BoundedRecentList<RecentSearchEntry> {
        &self.list
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

fn decode_entries(key: &str, value: Value) -> Vec<RecentSearchEntry> {
    let Value::Array(items) = value else {
        warn!("Stored recent searches under {} are not a list, ignoring", key);
        return Vec::new();
    };

    // Malformed elements are dropped one by one; the rest of the history survives
    items
        .into_iter()
        .enumerate()
        .filter_map(
            |(i, item)| match serde_json::from_value::<RecentSearchEntry>(item) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping malformed recent search #{} under {}: {}", i, key, e);
                    None
                }
            },
        )
        .collect()
}
