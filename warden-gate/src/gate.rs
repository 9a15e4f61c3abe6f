//! The preflight gate: runs the check battery, classifies the outcome, and
//! persists the report.

use chrono::Utc;

use warden_core::{DomainSpec, RepoConfig};

use crate::checks;
use crate::error::GateError;
use crate::report::{self, PreflightReport};

/// Aggregate outcome of a gate run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    /// All checks passed.
    Proceed,
    /// Warning-severity failures only; the session may start.
    Warn,
    /// At least one blocking failure; the session must not start.
    Blocked,
}

impl GateVerdict {
    pub fn of(report: &PreflightReport) -> Self {
        if report.blocked {
            GateVerdict::Blocked
        } else if report.warnings.is_empty() {
            GateVerdict::Proceed
        } else {
            GateVerdict::Warn
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GateVerdict::Proceed => "PROCEED",
            GateVerdict::Warn => "PROCEED (with warnings)",
            GateVerdict::Blocked => "BLOCKED",
        }
    }
}

/// Runs the preflight battery against one repository.
pub struct Gate<'a> {
    config: &'a RepoConfig,
    domains: &'a [DomainSpec],
}

impl<'a> Gate<'a> {
    pub fn new(config: &'a RepoConfig, domains: &'a [DomainSpec]) -> Self {
        Self { config, domains }
    }

    /// Run the battery and persist the report.
    ///
    /// The fast path runs only the blocking checks (session lock,
    /// containment); `validate_all` adds the warning-severity checks
    /// (sync status, skill structure). Checks run in a fixed order and
    /// every check always runs, so the report shows the full picture even
    /// when an early check already blocks.
    pub fn run(&self, validate_all: bool) -> Result<PreflightReport, GateError> {
        let mut results = vec![
            checks::check_session_lock(self.config),
            checks::check_containment(self.config, self.domains),
        ];
        if validate_all {
            results.push(checks::check_sync_status(self.config, self.domains));
            results.push(checks::check_structure(self.config, self.domains));
        }

        let blocked = results.iter().any(|check| check.is_blocking_failure());
        let warnings: Vec<String> = results
            .iter()
            .filter(|check| check.is_warning_failure())
            .map(|check| format!("{}: {}", check.name, check.message))
            .collect();
        let passed = results.iter().all(|check| check.passed);

        let report = PreflightReport {
            timestamp: Utc::now(),
            checks: results,
            passed,
            blocked,
            warnings,
        };
        report::save(self.config, &report)?;

        for check in &report.checks {
            if check.passed {
                log::debug!("{}: ok", check.name);
            } else {
                log::warn!("{}: {}", check.name, check.message);
            }
        }

        Ok(report)
    }

    /// Load the last persisted report without running anything.
    pub fn last_report(&self) -> Result<Option<PreflightReport>, GateError> {
        report::load(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use warden_core::lock::{self, POST_HOOK};
    use warden_core::registry::DomainSpec;

    fn fixture() -> (TempDir, RepoConfig, Vec<DomainSpec>) {
        let tmp = TempDir::new().unwrap();
        let config = RepoConfig::new(tmp.path());
        let domains = vec![
            DomainSpec::new("skills", "skills", "Agent Skills"),
            DomainSpec::new("hooks", "hooks", "AI Tool Hooks"),
        ];
        (tmp, config, domains)
    }

    #[test]
    fn clean_repo_proceeds_on_fast_path() {
        let (_tmp, config, domains) = fixture();
        let report = Gate::new(&config, &domains).run(false).unwrap();

        assert_eq!(GateVerdict::of(&report), GateVerdict::Proceed);
        assert_eq!(report.checks.len(), 2, "fast path runs blocking checks only");
        assert!(report.passed && !report.blocked);
    }

    #[test]
    fn active_lock_blocks_and_all_checks_still_run() {
        let (tmp, config, domains) = fixture();
        lock::create(&config).unwrap();
        fs::create_dir_all(tmp.path().join("skills")).unwrap();

        let report = Gate::new(&config, &domains).run(false).unwrap();
        assert_eq!(GateVerdict::of(&report), GateVerdict::Blocked);
        assert_eq!(report.checks.len(), 2);
        assert!(report.checks[1].passed, "containment still evaluated");
    }

    #[test]
    fn unsynced_domain_warns_but_does_not_block() {
        let (tmp, config, domains) = fixture();
        lock::mark_hook_complete(&config, POST_HOOK).unwrap();
        fs::create_dir_all(tmp.path().join("hooks")).unwrap();
        fs::write(tmp.path().join("hooks/entry.py"), "print('hi')\n").unwrap();

        let report = Gate::new(&config, &domains).run(true).unwrap();
        assert_eq!(GateVerdict::of(&report), GateVerdict::Warn);
        assert_eq!(report.checks.len(), 4);
        assert!(report.warnings.iter().any(|w| w.starts_with("sync-status:")));
    }

    #[test]
    fn blocked_outranks_warn() {
        let (tmp, config, domains) = fixture();
        lock::create(&config).unwrap();
        fs::create_dir_all(tmp.path().join("skills/orphan")).unwrap();

        let report = Gate::new(&config, &domains).run(true).unwrap();
        assert_eq!(GateVerdict::of(&report), GateVerdict::Blocked);
        assert!(!report.warnings.is_empty());
    }

    #[test]
    fn report_is_persisted_and_reloadable() {
        let (_tmp, config, domains) = fixture();
        let gate = Gate::new(&config, &domains);
        assert!(gate.last_report().unwrap().is_none());

        let report = gate.run(false).unwrap();
        let loaded = gate.last_report().unwrap().expect("persisted report");
        assert_eq!(loaded, report);
    }
}
