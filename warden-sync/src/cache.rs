//! Change cache — last-seen digest per domain.
//!
//! Persisted as a single JSON document at
//! `<root>/.warden/change_cache.json`. A missing or unparsable cache loads
//! as empty (every domain then registers as changed), and saves use the
//! atomic `.tmp` + rename pattern.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::{DirectoryState, DomainName, DomainSpec, RepoConfig};

use crate::error::{io_err, SyncError};
use crate::hasher;

/// On-disk change cache payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChangeCacheFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default)]
    pub directories: BTreeMap<DomainName, DirectoryState>,
}

/// Comparison of a domain's fresh digest against the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainChange {
    pub changed: bool,
    pub state: DirectoryState,
}

/// Load the change cache, treating a missing or corrupt file as empty.
pub fn load(config: &RepoConfig) -> ChangeCacheFile {
    let path = config.change_cache_path();
    if !path.exists() {
        return ChangeCacheFile::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            log::warn!("change cache unparsable, rebuilding: {err}");
            ChangeCacheFile::default()
        }),
        Err(err) => {
            log::warn!("change cache unreadable, rebuilding: {err}");
            ChangeCacheFile::default()
        }
    }
}

/// Save the change cache atomically.
pub fn save(config: &RepoConfig, cache: &ChangeCacheFile) -> Result<(), SyncError> {
    let path = config.change_cache_path();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let json = serde_json::to_string_pretty(cache)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

/// Compute fresh digests for every registered domain and compare against
/// the cache.
///
/// Optional domains whose directory is absent are skipped without error; a
/// missing non-optional directory registers as changed with an empty digest.
pub fn detect_changes(
    config: &RepoConfig,
    domains: &[DomainSpec],
) -> Result<BTreeMap<DomainName, DomainChange>, SyncError> {
    let cache = load(config);
    let mut changes = BTreeMap::new();

    for spec in domains {
        let source_dir = spec.source_dir_in(config);
        if !source_dir.exists() {
            if spec.is_optional() {
                log::debug!("optional domain '{}' absent, skipping", spec.name());
                continue;
            }
            // A required domain with no directory always needs attention.
            changes.insert(
                spec.name().clone(),
                DomainChange {
                    changed: true,
                    state: DirectoryState {
                        name: spec.name().clone(),
                        digest: String::new(),
                        file_count: 0,
                        hashed_at: Utc::now(),
                    },
                },
            );
            continue;
        }

        let tree = hasher::hash_tree(&source_dir)?;
        let cached_digest = cache
            .directories
            .get(spec.name())
            .map(|state| state.digest.as_str())
            .unwrap_or("");

        let state = DirectoryState {
            name: spec.name().clone(),
            digest: tree.digest,
            file_count: tree.file_count,
            hashed_at: Utc::now(),
        };
        changes.insert(
            spec.name().clone(),
            DomainChange {
                changed: state.digest != cached_digest,
                state,
            },
        );
    }

    Ok(changes)
}
