//! Path resolution
//!
//! Client paths are relative to the client's storage root. By default they
//! are joined as supplied, so `..` segments can address files outside the
//! root. [`resolve_within_root`] is the confined alternative, enabled with
//! the `confine_paths` setting.

use crate::error::StorageError;
use std::path::{Path, PathBuf};

/// Joins `relative` onto `root` segment by segment without any checks.
///
/// Empty segments are skipped, so leading or doubled slashes never turn the
/// result into an absolute path.
pub fn join_relative(root: &Path, relative: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in relative.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path
}

/// Lexically resolves `relative` under `root`, failing if it would escape it.
pub fn resolve_within_root(root: &Path, relative: &str) -> Result<PathBuf, StorageError> {
    let mut path = root.to_path_buf();
    let mut depth = 0usize;

    for segment in relative.split(['/', '\\']).filter(|s| !s.is_empty()) {
        match segment {
            "." => {}
            ".." => {
                if depth == 0 {
                    return Err(StorageError::PathTraversal(relative.to_string()));
                }
                path.pop();
                depth -= 1;
            }
            name => {
                path.push(name);
                depth += 1;
            }
        }
    }

    Ok(path)
}

/// Resolves a client path, confined to `root` when `confine` is set.
pub fn resolve_path(root: &Path, relative: &str, confine: bool) -> Result<PathBuf, StorageError> {
    if confine {
        resolve_within_root(root, relative)
    } else {
        Ok(join_relative(root, relative))
    }
}

/// Joins two client path fragments with a single slash.
pub fn join_client_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Parent of a client path, `""` for top-level entries.
pub fn parent_path(relative: &str) -> &str {
    relative
        .rsplit_once('/')
        .map(|(parent, _)| parent)
        .unwrap_or("")
}
