//! Storage result types
//!
//! Defines result structures returned by storage operations.

use tokio::fs::File;

/// One immediate child of a listed folder
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: String,
    pub is_folder: bool,
    /// Size in kilobytes rounded to one decimal; folders report 0
    pub size_kb: f64,
}

/// Admin view of one client storage root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSummary {
    /// Folder name, `user_<id>`
    pub folder: String,
    /// Regular files anywhere beneath the root
    pub file_count: usize,
}

/// An opened file ready to be streamed back to the client
#[derive(Debug)]
pub struct Download {
    pub file: File,
    pub file_name: String,
    pub len: u64,
}

/// What a successful delete removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    File,
    Folder,
}

/// Converts a byte count into kilobytes rounded to one decimal.
pub fn size_in_kb(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 * 10.0).round() / 10.0
}
