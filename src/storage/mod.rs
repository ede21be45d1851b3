//! Client storage management
//!
//! Locates per-client storage roots, resolves client paths and performs the
//! file operations behind the HTTP surface.

pub mod locator;
pub mod operations;
pub mod results;
pub mod validation;

pub use locator::StorageLocator;
pub use operations::{create_folder, delete_entry, list_directory, open_for_download, write_file};
pub use results::{ClientSummary, DeleteOutcome, Download, Entry};
pub use validation::{parent_path, resolve_path, resolve_within_root};
