//! `warden sync` — run handler chains for changed domains.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use warden_core::{registry, RepoConfig, SyncResult};
use warden_sync::{Orchestrator, ProcessRunner, SyncError};

/// Arguments for `warden sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Sync every domain even when its content is unchanged.
    #[arg(long)]
    pub force: bool,

    /// Restrict to these domains (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub only: Option<Vec<String>>,
}

impl SyncArgs {
    pub fn run(self, config: &RepoConfig) -> Result<ExitCode> {
        let domains = registry::builtin_domains();
        let runner = ProcessRunner::new(config);
        let orchestrator = Orchestrator::new(config, &domains, &runner);

        let report = match orchestrator.run(self.force, self.only.as_deref()) {
            Ok(report) => report,
            Err(SyncError::UnknownDomain { name, valid }) => {
                eprintln!(
                    "{} unknown domain '{name}' (valid: {valid})",
                    "error:".red().bold()
                );
                return Ok(ExitCode::from(1));
            }
            Err(err) => return Err(err.into()),
        };

        for result in &report.sync_results {
            print_result(result);
        }

        let changed = report.changes_detected.values().filter(|c| **c).count();
        if report.sync_results.is_empty() {
            println!("{} nothing to sync ({changed} changed domain(s))", "✓".green());
        } else if report.all_synced {
            println!(
                "{} {} handler(s) succeeded in {:.1}s",
                "✓".green(),
                report.sync_results.len(),
                report.total_duration_secs
            );
        } else {
            let failed = report.sync_results.iter().filter(|r| !r.success).count();
            println!(
                "{} {failed} handler(s) failed — session lock stays blocking",
                "✗".red().bold()
            );
        }

        Ok(if report.all_synced {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(2)
        })
    }
}

fn print_result(result: &SyncResult) {
    let marker = if result.success {
        "✓".green().to_string()
    } else {
        "✗".red().bold().to_string()
    };
    println!(
        "  {marker} {} {} ({}) — {} [{:.1}s]",
        result.domain,
        result.script,
        result.action,
        result.message,
        result.duration_secs
    );
}
