//! Domain types shared across the warden crates.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! Persisted types serialize via serde + serde_json.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for a governed content domain.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DomainName(pub String);

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for DomainName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DomainName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Mode a post-hook run was invoked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Check,
    Sync,
    Force,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Check => write!(f, "check"),
            RunMode::Sync => write!(f, "sync"),
            RunMode::Force => write!(f, "force"),
        }
    }
}

// ---------------------------------------------------------------------------
// Persisted structs
// ---------------------------------------------------------------------------

/// Snapshot of a domain directory's content at hash time.
///
/// The digest is a pure function of the sorted (relative path, file bytes)
/// pairs under the domain root, minus the skip set. An absent directory is
/// recorded with an empty digest and zero files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryState {
    pub name: DomainName,
    pub digest: String,
    pub file_count: usize,
    pub hashed_at: DateTime<Utc>,
}

/// Result of one collaborator script invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    pub domain: DomainName,
    pub script: String,
    pub action: String,
    pub success: bool,
    pub message: String,
    pub duration_secs: f64,
}

/// One entry in the rolling post-hook execution log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostHookReport {
    pub timestamp: DateTime<Utc>,
    pub mode: RunMode,
    /// Per-domain changed flags for the domains considered in this run.
    pub changes_detected: BTreeMap<DomainName, bool>,
    pub sync_results: Vec<SyncResult>,
    /// True iff every recorded [`SyncResult`] succeeded (vacuously true).
    pub all_synced: bool,
    pub total_duration_secs: f64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display_and_equality() {
        assert_eq!(DomainName::from("skills").to_string(), "skills");
        assert_eq!(DomainName::from("x"), DomainName::from(String::from("x")));
    }

    #[test]
    fn run_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&RunMode::Force).unwrap(), "\"force\"");
        assert_eq!(RunMode::Check.to_string(), "check");
    }

    #[test]
    fn report_serde_roundtrip() {
        let report = PostHookReport {
            timestamp: Utc::now(),
            mode: RunMode::Sync,
            changes_detected: BTreeMap::from([(DomainName::from("hooks"), true)]),
            sync_results: vec![SyncResult {
                domain: DomainName::from("hooks"),
                script: "sync.py".to_string(),
                action: "sync".to_string(),
                success: true,
                message: "Success".to_string(),
                duration_secs: 0.2,
            }],
            all_synced: true,
            total_duration_secs: 0.3,
        };
        let json = serde_json::to_string(&report).expect("serialize");
        let back: PostHookReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, report);
    }
}
