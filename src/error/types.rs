//! Error types
//!
//! Defines domain-specific error types for each module of the file manager.

use std::fmt;
use std::io;

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    FileNotFound(String),
    DirectoryNotFound(String),
    NotADirectory(String),
    NotAFile(String),
    DirectoryNotEmpty(String),
    PermissionDenied(String),
    InvalidName(String),
    PathTraversal(String),
    IoError(io::Error),
}

impl StorageError {
    /// Classify an I/O failure on `path` into the matching storage error.
    pub fn from_io(error: io::Error, path: &str) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => StorageError::FileNotFound(path.to_string()),
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied(path.to_string()),
            io::ErrorKind::DirectoryNotEmpty => StorageError::DirectoryNotEmpty(path.to_string()),
            io::ErrorKind::NotADirectory => StorageError::NotADirectory(path.to_string()),
            _ => StorageError::IoError(error),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::FileNotFound(p) => write!(f, "File not found: {}", p),
            StorageError::DirectoryNotFound(p) => write!(f, "Directory not found: {}", p),
            StorageError::NotADirectory(p) => write!(f, "Not a directory: {}", p),
            StorageError::NotAFile(p) => write!(f, "Not a file: {}", p),
            StorageError::DirectoryNotEmpty(p) => write!(f, "Directory not empty: {}", p),
            StorageError::PermissionDenied(p) => write!(f, "Permission denied: {}", p),
            StorageError::InvalidName(n) => write!(f, "Invalid name: {:?}", n),
            StorageError::PathTraversal(p) => write!(f, "Path traversal attempt: {}", p),
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}

/// Session module errors
#[derive(Debug)]
pub enum SessionError {
    InvalidClientId(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidClientId(id) => write!(f, "Invalid client id: {:?}", id),
        }
    }
}

impl std::error::Error for SessionError {}

/// Request-level error that encompasses all error types
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Validation(String),
    IoError(io::Error),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::Storage(e) => write!(f, "Storage error: {}", e),
            WebError::Validation(e) => write!(f, "Validation error: {}", e),
            WebError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for WebError {}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        WebError::Storage(error)
    }
}

impl From<io::Error> for WebError {
    fn from(error: io::Error) -> Self {
        WebError::IoError(error)
    }
}
