//! Atomic replacement of JSON documents on disk

use crate::traits::{StorageError, StorageResult};
use serde_json::Value;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes a whole document to a sibling temp file and renames it over the target
///
/// Readers see either the previous document or the new one, never a partial write.
pub struct AtomicWriter {
    temp_path: PathBuf,
    final_path: PathBuf,
    file: Option<File>,
}

impl AtomicWriter {
    /// Start replacing the document at `path`, creating parent directories as needed
    pub fn create(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let temp_path = Self::temp_path(path);
        let file = File::create(&temp_path)?;

        Ok(Self {
            temp_path,
            final_path: path.to_path_buf(),
            file: Some(file),
        })
    }

    /// Serialize `document` as pretty JSON into the pending file
    pub fn write_json(&mut self, document: &Value) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|e| StorageError::Serialization(format!("Failed to encode document: {}", e)))?;
        self.write_bytes(&bytes)
    }

    fn write_bytes(&mut self, data: &[u8]) -> StorageResult<()> {
        match self.file.as_mut() {
            Some(file) => Ok(file.write_all(data)?),
            None => Err(StorageError::InvalidData(
                "writer already committed".to_string(),
            )),
        }
    }

    /// Flush to disk and move the pending file into place
    pub fn commit(mut self) -> StorageResult<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
            file.sync_all()?;
        }
        fs::rename(&self.temp_path, &self.final_path)?;
        Ok(())
    }

    fn temp_path(final_path: &Path) -> PathBuf {
        let mut temp = final_path.as_os_str().to_owned();
        temp.push(format!(".{}.tmp", std::process::id()));
        PathBuf::from(temp)
    }
}

impl Drop for AtomicWriter {
    fn drop(&mut self) {
        // After a successful rename the temp path no longer exists
        let _ = fs::remove_file(&self.temp_path);
    }
}

/// Replace the document at `path` with `document`
pub fn replace_json(path: &Path, document: &Value) -> StorageResult<()> {
    let mut writer = AtomicWriter::create(path)?;
    writer.write_json(document)?;
    writer.commit()
}
