//! Deterministic content hashing for domain directories.
//!
//! The digest folds every (relative path, file bytes) pair under the domain
//! root into one SHA-256, in sorted relative-path order, so it depends only
//! on content — never on modification times or traversal order.
//!
//! Paths containing a segment from the skip set are excluded. The skip set
//! covers version-control and cache directories plus the files the sync
//! handlers themselves generate; hashing those would make every sync
//! register as a new change and loop forever.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{io_err, SyncError};

/// Path segments excluded from hashing.
pub const SKIP_SEGMENTS: &[&str] = &[
    ".git",
    "__pycache__",
    ".DS_Store",
    "node_modules",
    ".cache",
    "sync_state.json",
    "keyword_mappings.json",
    "keyword_skill_mapping.json",
    "skill_dag.json",
];

/// Digest of a directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeDigest {
    /// Hex SHA-256, or empty when the directory does not exist.
    pub digest: String,
    pub file_count: usize,
}

impl TreeDigest {
    /// Digest for an absent directory.
    pub fn empty() -> Self {
        Self {
            digest: String::new(),
            file_count: 0,
        }
    }
}

/// Whether a repo-relative path is excluded from hashing.
pub fn should_skip(relative: &Path) -> bool {
    relative.components().any(|component| {
        let segment = component.as_os_str().to_string_lossy();
        SKIP_SEGMENTS.contains(&segment.as_ref()) || segment.ends_with(".pyc")
    })
}

/// Compute the combined digest of all files under `dir`.
///
/// Returns [`TreeDigest::empty`] when `dir` does not exist. Files that
/// disappear or become unreadable mid-walk are skipped with a warning, like
/// any other volatile artifact.
pub fn hash_tree(dir: &Path) -> Result<TreeDigest, SyncError> {
    if !dir.exists() {
        return Ok(TreeDigest::empty());
    }

    let mut files = Vec::new();
    collect_files(dir, dir, &mut files)?;
    // Sort on the normalized relative path so the fold order is stable
    // across platforms and readdir orderings.
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = Sha256::new();
    let mut file_count = 0usize;
    for (rel, path) in files {
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("skipping unreadable file {}: {err}", path.display());
                continue;
            }
        };
        hasher.update(rel.as_bytes());
        hasher.update(&bytes);
        file_count += 1;
    }

    Ok(TreeDigest {
        digest: hex::encode(hasher.finalize()),
        file_count,
    })
}

/// Recursively collect `(normalized relative path, absolute path)` for every
/// non-skipped file under `dir`.
fn collect_files(
    root: &Path,
    dir: &Path,
    out: &mut Vec<(String, PathBuf)>,
) -> Result<(), SyncError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(&path);
        if should_skip(relative) {
            continue;
        }
        let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;
        if file_type.is_dir() {
            collect_files(root, &path, out)?;
        } else if file_type.is_file() {
            out.push((normalize(relative), path));
        }
    }
    Ok(())
}

/// Relative path with `/` separators regardless of platform.
fn normalize(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
