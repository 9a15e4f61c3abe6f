//! Session-lock state machine.
//!
//! A session lock records whether the mandatory post-work hook has completed
//! since the last work session began. Persisted states are ACTIVE and
//! COMPLETE; STALE and CORRUPT are read-time classifications and are never
//! written back by the read path.
//!
//! Contract: [`status`] is strictly read-only. Only [`mark_hook_complete`]
//! and [`clear`] mutate the lock file, and both write via `.tmp` + rename.
//!
//! Crash recovery: a dead process can leave an ACTIVE lock forever.
//! Staleness (age > 24 h) is a heuristic timeout that still requires a human
//! override to clear — automatic expiry would be unsafe if the session
//! really is still running.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RepoConfig;
use crate::error::{io_err, LockError};

/// Name of the mandatory post-work hook.
pub const POST_HOOK: &str = "post-hook";

/// An ACTIVE lock older than this is reported STALE.
pub const STALE_AFTER_HOURS: i64 = 24;

// ---------------------------------------------------------------------------
// Persisted shape
// ---------------------------------------------------------------------------

/// Persisted lock status. Derived states never appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistedStatus {
    Active,
    Complete,
}

/// On-disk session lock payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockFile {
    pub session_start: DateTime<Utc>,
    pub pid: u32,
    pub status: PersistedStatus,
    pub hooks_required: BTreeSet<String>,
    pub hooks_completed: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_by: String,
}

impl LockFile {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            session_start: now,
            pid: std::process::id(),
            status: PersistedStatus::Active,
            hooks_required: BTreeSet::from([POST_HOOK.to_string()]),
            hooks_completed: BTreeSet::new(),
            completed_at: None,
            created_by: "warden".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Derived status
// ---------------------------------------------------------------------------

/// Read-time classification of the session lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockStatus {
    /// No lock file exists.
    None,
    /// Previous session has unresolved work.
    Active {
        session_start: DateTime<Utc>,
        age_hours: i64,
    },
    /// Previous session completed its required hooks.
    Complete {
        session_start: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
    },
    /// ACTIVE lock older than [`STALE_AFTER_HOURS`] — probably abandoned.
    Stale {
        session_start: DateTime<Utc>,
        age_hours: i64,
    },
    /// The lock file exists but cannot be read or parsed.
    Corrupt { reason: String },
}

impl LockStatus {
    /// Whether this status must block a new session from starting.
    pub fn is_blocking(&self) -> bool {
        !matches!(self, LockStatus::None | LockStatus::Complete { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            LockStatus::None => "NONE",
            LockStatus::Active { .. } => "ACTIVE",
            LockStatus::Complete { .. } => "COMPLETE",
            LockStatus::Stale { .. } => "STALE",
            LockStatus::Corrupt { .. } => "CORRUPT",
        }
    }

    /// Human-readable status line.
    pub fn message(&self) -> String {
        match self {
            LockStatus::None => "No session lock exists. Ready to proceed.".to_string(),
            LockStatus::Active { session_start, .. } => format!(
                "Previous session started {session_start} but did not complete. \
                 Run `warden sync` to complete and unblock."
            ),
            LockStatus::Complete { completed_at, .. } => match completed_at {
                Some(at) => format!("Previous session completed at {at}"),
                None => "Previous session completed".to_string(),
            },
            LockStatus::Stale {
                session_start,
                age_hours,
            } => format!(
                "Stale session lock from {session_start} ({age_hours}h ago). Previous session \
                 may have crashed. Use `warden clear-lock` if sure."
            ),
            LockStatus::Corrupt { reason } => format!(
                "Session lock file is corrupt ({reason}). Use `warden clear-lock` to clear."
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Read path (no side effects)
// ---------------------------------------------------------------------------

/// Current derived lock status. Never mutates the file; read or parse
/// failures classify as [`LockStatus::Corrupt`].
pub fn status(config: &RepoConfig) -> LockStatus {
    status_at(config, Utc::now())
}

/// [`status`] with an injected clock, for staleness tests.
pub fn status_at(config: &RepoConfig, now: DateTime<Utc>) -> LockStatus {
    let path = config.session_lock_path();
    if !path.exists() {
        return LockStatus::None;
    }
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) => {
            return LockStatus::Corrupt {
                reason: err.to_string(),
            }
        }
    };
    match serde_json::from_str::<LockFile>(&contents) {
        Ok(lock) => classify(&lock, now),
        Err(err) => LockStatus::Corrupt {
            reason: err.to_string(),
        },
    }
}

fn classify(lock: &LockFile, now: DateTime<Utc>) -> LockStatus {
    match lock.status {
        PersistedStatus::Complete => LockStatus::Complete {
            session_start: lock.session_start,
            completed_at: lock.completed_at,
        },
        PersistedStatus::Active => {
            let age = now.signed_duration_since(lock.session_start);
            let age_hours = age.num_hours();
            if age > Duration::hours(STALE_AFTER_HOURS) {
                LockStatus::Stale {
                    session_start: lock.session_start,
                    age_hours,
                }
            } else {
                LockStatus::Active {
                    session_start: lock.session_start,
                    age_hours,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Mutating paths
// ---------------------------------------------------------------------------

/// Create a fresh ACTIVE lock for the current session.
pub fn create(config: &RepoConfig) -> Result<(), LockError> {
    save(config, &LockFile::new(Utc::now()))
}

/// Record completion of `hook`. Creates the lock lazily if none exists.
///
/// Flips the persisted status to COMPLETE (stamping `completed_at`) once the
/// completed set covers the non-empty required set. Returns the new derived
/// status.
pub fn mark_hook_complete(config: &RepoConfig, hook: &str) -> Result<LockStatus, LockError> {
    let now = Utc::now();
    let path = config.session_lock_path();
    let mut lock = if path.exists() {
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        serde_json::from_str::<LockFile>(&contents)?
    } else {
        LockFile::new(now)
    };

    lock.hooks_completed.insert(hook.to_string());
    if !lock.hooks_required.is_empty() && lock.hooks_required.is_subset(&lock.hooks_completed) {
        lock.status = PersistedStatus::Complete;
        lock.completed_at = Some(now);
    }

    save(config, &lock)?;
    log::debug!("session lock after '{hook}': {}", classify(&lock, now).label());
    Ok(classify(&lock, now))
}

/// Remove the lock file.
///
/// A fresh ACTIVE lock refuses to clear without `force` (the session may
/// genuinely still be running); every other status clears unconditionally.
/// Returns the status the lock had before removal.
pub fn clear(config: &RepoConfig, force: bool) -> Result<LockStatus, LockError> {
    let previous = status(config);
    match &previous {
        LockStatus::None => return Ok(previous),
        LockStatus::Active { session_start, .. } if !force => {
            return Err(LockError::ActiveLock {
                session_start: session_start.to_rfc3339(),
            });
        }
        _ => {}
    }
    let path = config.session_lock_path();
    std::fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
    log::info!("session lock cleared (was {})", previous.label());
    Ok(previous)
}

/// Atomic save: `.tmp` sibling, then rename.
fn save(config: &RepoConfig, lock: &LockFile) -> Result<(), LockError> {
    let path = config.session_lock_path();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let json = serde_json::to_string_pretty(lock)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config() -> (TempDir, RepoConfig) {
        let tmp = TempDir::new().expect("tempdir");
        let config = RepoConfig::new(tmp.path());
        (tmp, config)
    }

    fn write_lock(config: &RepoConfig, lock: &LockFile) {
        let path = config.session_lock_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, serde_json::to_string_pretty(lock).unwrap()).unwrap();
    }

    #[test]
    fn missing_lock_reports_none_and_does_not_block() {
        let (_tmp, config) = config();
        let status = status(&config);
        assert_eq!(status, LockStatus::None);
        assert!(!status.is_blocking());
    }

    #[test]
    fn create_yields_active_blocking_lock() {
        let (_tmp, config) = config();
        create(&config).expect("create");
        let status = status(&config);
        assert_eq!(status.label(), "ACTIVE");
        assert!(status.is_blocking());
    }

    #[test]
    fn single_required_hook_completion_flips_to_complete() {
        let (_tmp, config) = config();
        let status = mark_hook_complete(&config, POST_HOOK).expect("mark");
        match status {
            LockStatus::Complete { completed_at, .. } => {
                assert!(completed_at.is_some(), "completed_at must be stamped");
            }
            other => panic!("expected COMPLETE, got {other:?}"),
        }
        assert!(!super::status(&config).is_blocking());
    }

    #[test]
    fn unrelated_hook_leaves_lock_active() {
        let (_tmp, config) = config();
        create(&config).expect("create");
        let status = mark_hook_complete(&config, "other-hook").expect("mark");
        assert_eq!(status.label(), "ACTIVE");
    }

    #[test]
    fn complete_lock_stays_complete_on_repeat_completion() {
        let (_tmp, config) = config();
        mark_hook_complete(&config, POST_HOOK).expect("first");
        let status = mark_hook_complete(&config, POST_HOOK).expect("second");
        assert_eq!(status.label(), "COMPLETE");
    }

    #[test]
    fn active_lock_older_than_24h_reports_stale() {
        let (_tmp, config) = config();
        let mut lock = LockFile::new(Utc::now() - Duration::hours(25));
        lock.pid = 1;
        write_lock(&config, &lock);

        let status = status(&config);
        match status {
            LockStatus::Stale { age_hours, .. } => assert!(age_hours >= 24),
            other => panic!("expected STALE, got {other:?}"),
        }
        assert!(status.is_blocking());
    }

    #[test]
    fn active_lock_one_hour_old_is_active_not_stale() {
        let (_tmp, config) = config();
        write_lock(&config, &LockFile::new(Utc::now() - Duration::hours(1)));

        let status = status(&config);
        assert_eq!(status.label(), "ACTIVE");
        assert!(status.is_blocking());
    }

    #[test]
    fn unreadable_lock_reports_corrupt_without_mutation() {
        let (_tmp, config) = config();
        let path = config.session_lock_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let status = status(&config);
        assert_eq!(status.label(), "CORRUPT");
        assert!(status.is_blocking());
        // Read path must leave the bytes untouched.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    }

    #[test]
    fn clear_active_without_force_fails_and_leaves_file() {
        let (_tmp, config) = config();
        create(&config).expect("create");

        let err = clear(&config, false).unwrap_err();
        assert!(matches!(err, LockError::ActiveLock { .. }));
        assert!(config.session_lock_path().exists());
    }

    #[test]
    fn clear_active_with_force_removes_file() {
        let (_tmp, config) = config();
        create(&config).expect("create");

        let previous = clear(&config, true).expect("clear");
        assert_eq!(previous.label(), "ACTIVE");
        assert!(!config.session_lock_path().exists());
    }

    #[test]
    fn stale_and_corrupt_locks_clear_without_force() {
        let (_tmp, config) = config();
        write_lock(&config, &LockFile::new(Utc::now() - Duration::hours(48)));
        assert_eq!(clear(&config, false).expect("clear stale").label(), "STALE");

        let path = config.session_lock_path();
        std::fs::write(&path, "garbage").unwrap();
        assert_eq!(
            clear(&config, false).expect("clear corrupt").label(),
            "CORRUPT"
        );
        assert!(!path.exists());
    }

    #[test]
    fn clear_when_no_lock_is_a_no_op() {
        let (_tmp, config) = config();
        assert_eq!(clear(&config, false).expect("clear"), LockStatus::None);
    }

    #[test]
    fn save_leaves_no_tmp_file_behind() {
        let (_tmp, config) = config();
        create(&config).expect("create");
        let tmp_path = config.session_lock_path().with_extension("json.tmp");
        assert!(!tmp_path.exists());
    }
}
