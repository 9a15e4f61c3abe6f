//! Sync orchestration over the domain handler registry.
//!
//! For each changed (or forced) domain the orchestrator runs an ordered
//! handler chain: an optional best-effort pre-step, then the preferred
//! self-contained script whose success short-circuits the chain, then
//! ordered fallbacks that stop at the first failure. Domains are isolated
//! from each other — only the intra-domain fallback chain is fail-fast.
//!
//! Execution is strictly sequential; all slow work happens in the
//! collaborator processes behind [`ScriptRunner`].

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::Utc;

use warden_core::{
    lock, registry, DomainName, DomainSpec, PostHookReport, RepoConfig, RunMode, ScriptStep,
    SyncResult,
};

use crate::cache::{self, ChangeCacheFile};
pub use crate::cache::DomainChange;
use crate::error::SyncError;
use crate::reports;
use crate::runner::{ScriptRunner, SCRIPT_TIMEOUT};

/// Side-effect-free sync-status probe result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub changes: BTreeMap<DomainName, DomainChange>,
}

impl CheckReport {
    /// Names of domains whose content differs from the cache.
    pub fn changed_domains(&self) -> Vec<&DomainName> {
        self.changes
            .iter()
            .filter(|(_, change)| change.changed)
            .map(|(name, _)| name)
            .collect()
    }

    pub fn all_synced(&self) -> bool {
        self.changes.values().all(|change| !change.changed)
    }
}

/// Decides which domain handlers to run, runs them in registry order, and
/// persists the rebuilt change cache plus an audit report.
pub struct Orchestrator<'a> {
    config: &'a RepoConfig,
    domains: &'a [DomainSpec],
    runner: &'a dyn ScriptRunner,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a RepoConfig,
        domains: &'a [DomainSpec],
        runner: &'a dyn ScriptRunner,
    ) -> Self {
        Self {
            config,
            domains,
            runner,
        }
    }

    /// Check-only mode: fresh digests compared against the cache, no
    /// handlers invoked, nothing persisted.
    pub fn check(&self) -> Result<CheckReport, SyncError> {
        Ok(CheckReport {
            changes: cache::detect_changes(self.config, self.domains)?,
        })
    }

    /// Run the handler chains for every changed domain (all domains when
    /// `force`; restricted to `only` when given).
    ///
    /// Regardless of which domains were processed, the change cache is
    /// rebuilt afterwards from fresh digests of every registered domain, so
    /// it always reflects current on-disk content. On aggregate success the
    /// mandatory post-work hook is marked complete on the session lock.
    pub fn run(&self, force: bool, only: Option<&[String]>) -> Result<PostHookReport, SyncError> {
        if let Some(names) = only {
            self.validate_only(names)?;
        }

        let started = Instant::now();
        let changes = cache::detect_changes(self.config, self.domains)?;

        let mut sync_results = Vec::new();
        let mut changes_detected = BTreeMap::new();

        for spec in self.domains {
            if let Some(names) = only {
                if !names.iter().any(|n| n == &spec.name().0) {
                    continue;
                }
            }
            // Optional domains with no directory never make it into the
            // change map.
            let Some(change) = changes.get(spec.name()) else {
                continue;
            };
            changes_detected.insert(spec.name().clone(), change.changed);

            if !change.changed && !force {
                log::debug!(
                    "{}: no changes (digest {})",
                    spec.name(),
                    preview(&change.state.digest)
                );
                continue;
            }

            let reason = if change.changed { "changed" } else { "forced" };
            log::info!(
                "{}: syncing ({reason}, {} files)",
                spec.name(),
                change.state.file_count
            );
            sync_results.extend(self.run_domain(spec));
        }

        self.rebuild_cache()?;

        let all_synced = sync_results.iter().all(|result| result.success);
        let report = PostHookReport {
            timestamp: Utc::now(),
            mode: if force { RunMode::Force } else { RunMode::Sync },
            changes_detected,
            sync_results,
            all_synced,
            total_duration_secs: started.elapsed().as_secs_f64(),
        };
        reports::append(self.config, &report)?;

        if report.all_synced {
            // Completing the mandatory hook is what unblocks the next
            // session's preflight gate, including the nothing-to-sync case.
            if let Err(err) = lock::mark_hook_complete(self.config, lock::POST_HOOK) {
                log::warn!("failed to mark session hook complete: {err}");
            }
        }

        Ok(report)
    }

    /// Run one domain's handler chain.
    fn run_domain(&self, spec: &DomainSpec) -> Vec<SyncResult> {
        let mut results = Vec::new();

        // Pre-step is best-effort: its failure is recorded but never blocks
        // the rest of the chain.
        if let Some(step) = spec.pre_step() {
            if self.config.resolve(&step.script).exists() {
                results.push(self.run_step(spec, step));
            }
        }

        if let Some(step) = spec.self_contained() {
            if self.config.resolve(&step.script).exists() {
                let result = self.run_step(spec, step);
                let success = result.success;
                results.push(result);
                if success {
                    return results;
                }
            }
        }

        for step in spec.fallbacks() {
            let path = self.config.resolve(&step.script);
            if !path.exists() {
                results.push(SyncResult {
                    domain: spec.name().clone(),
                    script: step.script_name(),
                    action: step.action_label(),
                    success: false,
                    message: format!("Script not found: {}", path.display()),
                    duration_secs: 0.0,
                });
                break;
            }
            let result = self.run_step(spec, step);
            let success = result.success;
            results.push(result);
            if !success {
                break;
            }
        }

        results
    }

    fn run_step(&self, spec: &DomainSpec, step: &ScriptStep) -> SyncResult {
        let script = self.config.resolve(&step.script);
        let outcome = self
            .runner
            .run(&script, step.action.as_deref(), SCRIPT_TIMEOUT);
        if !outcome.success {
            log::warn!("{}/{}: {}", spec.name(), step.script_name(), outcome.message);
        }
        SyncResult {
            domain: spec.name().clone(),
            script: step.script_name(),
            action: step.action_label(),
            success: outcome.success,
            message: outcome.message,
            duration_secs: outcome.duration.as_secs_f64(),
        }
    }

    /// Rebuild the whole cache from fresh digests of all registered domains.
    fn rebuild_cache(&self) -> Result<(), SyncError> {
        let fresh = cache::detect_changes(self.config, self.domains)?;
        let mut rebuilt = ChangeCacheFile {
            last_run: Some(Utc::now()),
            directories: BTreeMap::new(),
        };
        for (name, change) in fresh {
            rebuilt.directories.insert(name, change.state);
        }
        cache::save(self.config, &rebuilt)
    }

    fn validate_only(&self, names: &[String]) -> Result<(), SyncError> {
        for name in names {
            if registry::find(self.domains, name).is_none() {
                return Err(SyncError::UnknownDomain {
                    name: name.clone(),
                    valid: self
                        .domains
                        .iter()
                        .map(|d| d.name().0.clone())
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        }
        Ok(())
    }
}

fn preview(digest: &str) -> &str {
    if digest.is_empty() {
        "none"
    } else {
        &digest[..digest.len().min(12)]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
