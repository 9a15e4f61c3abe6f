//! Per-repository configuration.
//!
//! Every component takes a [`RepoConfig`] instead of reading module-level
//! paths, so tests can point the whole stack at a `TempDir` fixture.

use std::path::{Path, PathBuf};

/// Default interpreter used to invoke collaborator sync scripts.
pub const DEFAULT_RUNTIME: &str = "python3";

/// Directory under the repository root holding all persisted state files.
pub const STATE_DIR: &str = ".warden";

/// Resolved paths and settings for one repository checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoConfig {
    /// Absolute (or test-relative) path to the repository root.
    pub root: PathBuf,
    /// Directory holding the cache, lock, and report files.
    pub cache_dir: PathBuf,
    /// Interpreter for collaborator scripts (`<runtime> <script> [<action>]`).
    pub runtime: String,
}

impl RepoConfig {
    /// Configuration rooted at `root`, with state under `<root>/.warden/`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let cache_dir = root.join(STATE_DIR);
        Self {
            root,
            cache_dir,
            runtime: DEFAULT_RUNTIME.to_string(),
        }
    }

    /// Override the collaborator script interpreter.
    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }

    /// `<cache_dir>/change_cache.json` — last-seen digest per domain.
    pub fn change_cache_path(&self) -> PathBuf {
        self.cache_dir.join("change_cache.json")
    }

    /// `<cache_dir>/session_lock.json` — the session lock.
    pub fn session_lock_path(&self) -> PathBuf {
        self.cache_dir.join("session_lock.json")
    }

    /// `<cache_dir>/post_hook_log.json` — rolling post-hook report log.
    pub fn post_hook_log_path(&self) -> PathBuf {
        self.cache_dir.join("post_hook_log.json")
    }

    /// `<cache_dir>/preflight_report.json` — latest preflight report.
    pub fn preflight_report_path(&self) -> PathBuf {
        self.cache_dir.join("preflight_report.json")
    }

    /// Resolve a repo-relative path against the root.
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }
}
