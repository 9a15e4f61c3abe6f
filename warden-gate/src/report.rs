//! Preflight report — latest run only, overwritten in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::RepoConfig;

use crate::error::{io_err, GateError};

/// Severity of a preflight check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Failure halts session start.
    Blocking,
    /// Failure is reported but the session may proceed.
    Warning,
}

/// Result of one preflight check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub severity: Severity,
    pub details: serde_json::Value,
}

impl CheckResult {
    pub fn is_blocking_failure(&self) -> bool {
        !self.passed && self.severity == Severity::Blocking
    }

    pub fn is_warning_failure(&self) -> bool {
        !self.passed && self.severity == Severity::Warning
    }
}

/// Persisted preflight report. Unlike the post-hook log this keeps only the
/// latest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreflightReport {
    pub timestamp: DateTime<Utc>,
    /// Checks in execution order.
    pub checks: Vec<CheckResult>,
    pub passed: bool,
    pub blocked: bool,
    pub warnings: Vec<String>,
}

/// Overwrite the persisted report atomically.
pub fn save(config: &RepoConfig, report: &PreflightReport) -> Result<(), GateError> {
    let path = config.preflight_report_path();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let json = serde_json::to_string_pretty(report)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

/// Load the last persisted report, if any.
pub fn load(config: &RepoConfig) -> Result<Option<PreflightReport>, GateError> {
    let path = config.preflight_report_path();
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    Ok(Some(serde_json::from_str(&contents)?))
}
