//! Session-lock check — did the previous session complete its mandatory
//! post-work step?

use serde_json::json;

use warden_core::{lock, LockStatus, RepoConfig};

use crate::report::{CheckResult, Severity};

pub const NAME: &str = "session-lock";

/// Passes on NONE/COMPLETE; fails (blocking) on ACTIVE, STALE, or CORRUPT.
pub fn check_session_lock(config: &RepoConfig) -> CheckResult {
    let status = lock::status(config);

    let details = match &status {
        LockStatus::None => json!({ "status": "NONE" }),
        LockStatus::Active {
            session_start,
            age_hours,
        } => json!({
            "status": "ACTIVE",
            "session_start": session_start.to_rfc3339(),
            "age_hours": age_hours,
            "required_action": "Run `warden sync` to complete the previous session",
        }),
        LockStatus::Complete {
            session_start,
            completed_at,
        } => json!({
            "status": "COMPLETE",
            "session_start": session_start.to_rfc3339(),
            "completed_at": completed_at.as_ref().map(|at| at.to_rfc3339()),
        }),
        LockStatus::Stale {
            session_start,
            age_hours,
        } => json!({
            "status": "STALE",
            "session_start": session_start.to_rfc3339(),
            "age_hours": age_hours,
            "required_action": "Use `warden clear-lock` if no session is running",
        }),
        LockStatus::Corrupt { reason } => json!({
            "status": "CORRUPT",
            "reason": reason,
        }),
    };

    CheckResult {
        name: NAME.to_string(),
        passed: !status.is_blocking(),
        message: status.message(),
        severity: Severity::Blocking,
        details,
    }
}
