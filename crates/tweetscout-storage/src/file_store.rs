//! JSON document store backed by a single file

use crate::atomic_writer::replace_json;
use crate::traits::{StorageError, StorageResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use tweetscout_core::{CredentialStore, PersistenceBackend, Result};

/// Key/value store kept as one JSON object on disk
///
/// The whole document is held in memory and rewritten atomically after
/// every mutation, so a crash never leaves a half-written file.
pub struct JsonFileStore {
    path: PathBuf,
    document: RwLock<Map<String, Value>>,
}

impl JsonFileStore {
    /// Open the store at `path`
    ///
    /// A missing file starts an empty store. A file that is not a JSON object
    /// is logged and treated as empty; it is replaced on the next write.
    pub async fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        let document = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            match parse_document(&content) {
                Ok(document) => document,
                Err(e) => {
                    warn!(
                        "Ignoring unreadable store {}: {}",
                        path.display(),
                        e
                    );
                    Map::new()
                }
            }
        } else {
            debug!("Store file {} does not exist yet", path.display());
            Map::new()
        };

        Ok(Self {
            path,
            document: RwLock::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of keys currently stored
    pub async fn len(&self) -> usize {
        self.document.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.document.read().await.is_empty()
    }

    async fn get_value(&self, key: &str) -> Option<Value> {
        self.document.read().await.get(key).cloned()
    }

    // Mutations go to a copy that replaces the live map only once it is on disk
    async fn put_value(&self, key: &str, value: Value) -> StorageResult<()> {
        let mut document = self.document.write().await;
        let mut updated = document.clone();
        updated.insert(key.to_string(), value);
        self.flush(&updated)?;
        *document = updated;
        Ok(())
    }

    async fn delete_value(&self, key: &str) -> StorageResult<()> {
        let mut document = self.document.write().await;
        if !document.contains_key(key) {
            return Ok(());
        }
        let mut updated = document.clone();
        updated.remove(key);
        self.flush(&updated)?;
        *document = updated;
        Ok(())
    }

    // Called with the write lock held so concurrent writers cannot interleave renames
    fn flush(&self, document: &Map<String, Value>) -> StorageResult<()> {
        replace_json(&self.path, &Value::Object(document.clone()))?;
        debug!("Persisted {} keys to {}", document.len(), self.path.display());
        Ok(())
    }
}

fn parse_document(content: &str) -> StorageResult<Map<String, Value>> {
    if content.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StorageError::InvalidData(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
        Err(e) => Err(StorageError::Serialization(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl CredentialStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .get_value(key)
            .await
            .and_then(|v| v.as_str().map(str::to_string)))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        Ok(self.put_value(key, Value::String(value.to_string())).await?)
    }

    async fn remove(&self, key: &str) -> Result<()> {
        Ok(self.delete_value(key).await?)
    }
}

#[async_trait]
impl PersistenceBackend for JsonFileStore {
    async fn load(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.get_value(key).await)
    }

    async fn save(&self, key: &str, value: Value) -> Result<()> {
        Ok(self.put_value(key, value).await?)
    }
}
