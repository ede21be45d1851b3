//! Storage locator
//!
//! Maps client identities onto `user_<id>` folders under the base storage root.

use crate::error::StorageError;
use crate::session::ClientId;
use crate::storage::results::ClientSummary;
use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::fs;

const CLIENT_FOLDER_PREFIX: &str = "user_";

#[derive(Debug, Clone)]
pub struct StorageLocator {
    base: PathBuf,
}

impl StorageLocator {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Base storage root holding every client folder
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Creates the base storage root if it is missing.
    pub async fn ensure_base(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base).await?;
        Ok(())
    }

    /// Path of a client's root, without touching the filesystem
    pub fn client_root_path(&self, id: &ClientId) -> PathBuf {
        self.base.join(id.folder_name())
    }

    /// Returns the client's root, creating it and any ancestors first.
    pub async fn client_root(&self, id: &ClientId) -> Result<PathBuf, StorageError> {
        let root = self.client_root_path(id);
        fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::from_io(e, &id.folder_name()))?;
        debug!("Resolved storage root for {}: {}", id, root.display());
        Ok(root)
    }

    /// Whether a storage root already exists for `id`
    pub async fn root_exists(&self, id: &ClientId) -> bool {
        fs::metadata(self.client_root_path(id))
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Lists every client root with the number of files beneath it.
    pub async fn list_clients(&self) -> Result<Vec<ClientSummary>, StorageError> {
        let mut clients = Vec::new();

        let mut entries = match fs::read_dir(&self.base).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(clients),
            Err(e) => return Err(StorageError::from_io(e, &self.base.to_string_lossy())),
        };

        while let Some(entry) = entries.next_entry().await? {
            let folder = entry.file_name().to_string_lossy().to_string();
            if !folder.starts_with(CLIENT_FOLDER_PREFIX) {
                continue;
            }
            let file_count = count_files(&entry.path()).await?;
            clients.push(ClientSummary { folder, file_count });
        }

        clients.sort_by(|a, b| a.folder.cmp(&b.folder));
        info!("Listed {} client storage roots", clients.len());
        Ok(clients)
    }
}

/// Counts non-directory entries anywhere beneath `root`.
async fn count_files(root: &Path) -> Result<usize, StorageError> {
    let mut count = 0;
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotADirectory => {
                count += 1;
                continue;
            }
            Err(e) => return Err(StorageError::from_io(e, &dir.to_string_lossy())),
        };

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                pending.push(entry.path());
            } else {
                count += 1;
            }
        }
    }

    Ok(count)
}
