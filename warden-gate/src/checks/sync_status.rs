//! Sync-status check — does any domain have content newer than its last
//! recorded sync?
//!
//! Runs the orchestrator's check mode in process. Out-of-date domains are a
//! warning: the session may start, but `warden sync` is overdue.

use serde_json::json;

use warden_core::{DomainSpec, RepoConfig};
use warden_sync::{Orchestrator, ProcessRunner};

use crate::report::{CheckResult, Severity};

pub const NAME: &str = "sync-status";

pub fn check_sync_status(config: &RepoConfig, domains: &[DomainSpec]) -> CheckResult {
    // Check mode never invokes handlers, so the runner is inert here.
    let runner = ProcessRunner::new(config);
    let orchestrator = Orchestrator::new(config, domains, &runner);

    match orchestrator.check() {
        Ok(report) => {
            let changed: Vec<String> = report
                .changed_domains()
                .into_iter()
                .map(|name| name.0.clone())
                .collect();
            let passed = changed.is_empty();
            let message = if passed {
                "All domains in sync".to_string()
            } else {
                format!("{} domain(s) out of sync: {}", changed.len(), changed.join(", "))
            };
            CheckResult {
                name: NAME.to_string(),
                passed,
                message,
                severity: Severity::Warning,
                details: json!({
                    "changed_domains": changed,
                    "domains_checked": report.changes.len(),
                }),
            }
        }
        Err(err) => CheckResult {
            name: NAME.to_string(),
            passed: false,
            message: format!("Sync status probe failed: {err}"),
            severity: Severity::Warning,
            details: json!({ "error": err.to_string() }),
        },
    }
}
