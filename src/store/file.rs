//! Directory-backed store.
//!
//! Each key is one file inside a directory. Intended as a fallback, or for
//! running outside a cluster. The store owns the directory: it is created on
//! the first write and removed once a delete leaves it empty.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};

use super::{validate_key, BackendType, Store};
use crate::errors::{Result, StoreError};

/// Store backed by files in one directory
#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    /// Bind to `directory`. Nothing is touched until the first write.
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self { directory: directory.as_ref().to_path_buf() }
    }

    /// Get the backing directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Convert a key to its file path.
    ///
    /// Keys must name a file directly inside the directory.
    fn key_to_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        if key == "." || key == ".." {
            return Err(StoreError::invalid_key(key, "key cannot be '.' or '..'"));
        }
        if key.contains(['/', '\\', '\0']) {
            return Err(StoreError::invalid_key(key, "key cannot contain path separators"));
        }
        Ok(self.directory.join(key))
    }
}

#[async_trait]
impl Store for FileStore {
    fn backend_type(&self) -> BackendType {
        BackendType::File
    }

    async fn get_raw(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.key_to_path(key)?;

        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::not_found(key)),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_raw(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.key_to_path(key)?;

        fs::create_dir_all(&self.directory).await?;
        fs::write(&path, data).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                continue;
            }
            // Keys are strings; a name that is not UTF-8 cannot round-trip.
            match entry.file_name().into_string() {
                Ok(name) => keys.push(name),
                Err(name) => debug!(?name, "Skipping non-UTF-8 file name"),
            }
        }
        keys.sort();
        Ok(keys)
    }

    #[instrument(level = "debug", skip(self), fields(directory = %self.directory.display()))]
    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.key_to_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        // Only succeeds once the directory is empty; any failure is ignored.
        if fs::remove_dir(&self.directory).await.is_ok() {
            debug!(directory = %self.directory.display(), "Removed empty store directory");
        }
        Ok(())
    }
}
