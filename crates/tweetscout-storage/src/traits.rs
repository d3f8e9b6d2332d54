//! Storage error definitions

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for tweetscout_core::Error {
    fn from(err: StorageError) -> Self {
        tweetscout_core::Error::Persistence(err.to_string())
    }
}
