//! Storage operations
//!
//! Handles filesystem operations for the HTTP handlers: list, upload,
//! download, delete and folder creation inside a client's storage root.

use log::{error, info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::StorageError;
use crate::storage::results::{DeleteOutcome, Download, Entry, size_in_kb};
use crate::storage::validation::{join_client_path, resolve_path};

/// Lists the immediate children of `relative` in filesystem order
pub async fn list_directory(
    root: &Path,
    relative: &str,
    confine: bool,
) -> Result<Vec<Entry>, StorageError> {
    let real_path = resolve_path(root, relative, confine)?;

    let mut entries = fs::read_dir(&real_path).await.map_err(|e| {
        warn!(
            "Failed to list directory {:?} (real: {}): {}",
            relative,
            real_path.display(),
            e
        );
        match e.kind() {
            ErrorKind::NotFound => StorageError::DirectoryNotFound(relative.to_string()),
            ErrorKind::NotADirectory => StorageError::NotADirectory(relative.to_string()),
            _ => StorageError::from_io(e, relative),
        }
    })?;

    let mut listing = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();

        // Follows symlinks; a dangling link is shown as an empty file.
        let (is_folder, size_kb) = match fs::metadata(entry.path()).await {
            Ok(metadata) if metadata.is_dir() => (true, 0.0),
            Ok(metadata) if metadata.is_file() => (false, size_in_kb(metadata.len())),
            _ => (false, 0.0),
        };

        listing.push(Entry {
            name,
            is_folder,
            size_kb,
        });
    }

    info!(
        "Listed directory {:?} (real: {}) - {} entries",
        relative,
        real_path.display(),
        listing.len()
    );

    Ok(listing)
}

/// Writes an uploaded file into `dir`, replacing any file of the same name
pub async fn write_file(
    root: &Path,
    dir: &str,
    file_name: &str,
    contents: &[u8],
    confine: bool,
) -> Result<PathBuf, StorageError> {
    if file_name.is_empty() {
        return Err(StorageError::InvalidName(file_name.to_string()));
    }

    let relative = join_client_path(dir, file_name);
    let file_path = resolve_path(root, &relative, confine)?;

    fs::write(&file_path, contents).await.map_err(|e| {
        error!(
            "Failed to store {:?} (real: {}): {}",
            relative,
            file_path.display(),
            e
        );
        match e.kind() {
            ErrorKind::NotFound => StorageError::DirectoryNotFound(dir.to_string()),
            _ => StorageError::from_io(e, &relative),
        }
    })?;

    info!(
        "Stored {:?} ({} bytes, real: {})",
        relative,
        contents.len(),
        file_path.display()
    );

    Ok(file_path)
}

/// Opens a file for streaming back to the client
pub async fn open_for_download(
    root: &Path,
    relative: &str,
    confine: bool,
) -> Result<Download, StorageError> {
    let file_path = resolve_path(root, relative, confine)?;

    let metadata = fs::metadata(&file_path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => StorageError::FileNotFound(relative.to_string()),
        _ => StorageError::from_io(e, relative),
    })?;

    if !metadata.is_file() {
        return Err(StorageError::NotAFile(relative.to_string()));
    }

    let file = fs::File::open(&file_path)
        .await
        .map_err(|e| StorageError::from_io(e, relative))?;

    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    info!(
        "Prepared download of {:?} ({} bytes, real: {})",
        relative,
        metadata.len(),
        file_path.display()
    );

    Ok(Download {
        file,
        file_name,
        len: metadata.len(),
    })
}

/// Deletes a file, or a folder if it is empty
pub async fn delete_entry(
    root: &Path,
    relative: &str,
    confine: bool,
) -> Result<DeleteOutcome, StorageError> {
    if relative.trim_matches('/').is_empty() {
        return Err(StorageError::InvalidName(relative.to_string()));
    }

    let path = resolve_path(root, relative, confine)?;

    let is_file = fs::metadata(&path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);

    let result = if is_file {
        fs::remove_file(&path).await.map(|_| DeleteOutcome::File)
    } else {
        fs::remove_dir(&path).await.map(|_| DeleteOutcome::Folder)
    };

    match result {
        Ok(outcome) => {
            info!("Deleted {:?} ({:?}, real: {})", relative, outcome, path.display());
            Ok(outcome)
        }
        Err(e) => {
            let err = StorageError::from_io(e, relative);
            warn!("Failed to delete {:?} (real: {}): {}", relative, path.display(), err);
            Err(err)
        }
    }
}

/// Creates `name` under `dir`, including missing parents; existing folders are fine
pub async fn create_folder(
    root: &Path,
    dir: &str,
    name: &str,
    confine: bool,
) -> Result<PathBuf, StorageError> {
    if name.is_empty() {
        return Err(StorageError::InvalidName(name.to_string()));
    }

    let relative = join_client_path(dir, name);
    let folder_path = resolve_path(root, &relative, confine)?;

    fs::create_dir_all(&folder_path).await.map_err(|e| {
        error!(
            "Failed to create folder {:?} (real: {}): {}",
            relative,
            folder_path.display(),
            e
        );
        StorageError::from_io(e, &relative)
    })?;

    info!("Created folder {:?} (real: {})", relative, folder_path.display());
    Ok(folder_path)
}
