//! `warden gate` — session-start preflight.
//!
//! Exit codes: 0 proceed, 1 blocked, 3 proceed with warnings. Gate
//! infrastructure failures surface as errors (exit 2 from main).

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use warden_core::{registry, RepoConfig};
use warden_gate::{CheckResult, Gate, GateVerdict, PreflightReport, Severity};

/// Arguments for `warden gate`.
#[derive(Args, Debug)]
pub struct GateArgs {
    /// Run the full battery including warning-severity checks.
    #[arg(long)]
    pub validate: bool,

    /// Show the last persisted report instead of running checks.
    #[arg(long, conflicts_with = "validate")]
    pub status: bool,

    /// Clear the session lock instead of running checks.
    #[arg(long, conflicts_with_all = ["validate", "status"])]
    pub clear_lock: bool,

    /// With --clear-lock: clear even a fresh ACTIVE lock.
    #[arg(long, requires = "clear_lock")]
    pub force: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl GateArgs {
    pub fn run(self, config: &RepoConfig) -> Result<ExitCode> {
        if self.clear_lock {
            return super::lock::ClearLockArgs { force: self.force }.run(config);
        }

        let domains = registry::builtin_domains();
        let gate = Gate::new(config, &domains);

        if self.status {
            return match gate.last_report().context("failed to load preflight report")? {
                Some(report) => self.render(&report),
                None => {
                    println!("No preflight report recorded. Run `warden gate` first.");
                    Ok(ExitCode::SUCCESS)
                }
            };
        }

        let report = gate.run(self.validate).context("preflight gate failed")?;
        self.render(&report)
    }

    fn render(&self, report: &PreflightReport) -> Result<ExitCode> {
        let verdict = GateVerdict::of(report);

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(report).context("failed to serialize gate JSON")?
            );
        } else {
            println!("Preflight at {}", report.timestamp.to_rfc3339());
            for check in &report.checks {
                print_check(check);
            }
            println!("{}", verdict_line(verdict));
        }

        Ok(match verdict {
            GateVerdict::Proceed => ExitCode::SUCCESS,
            GateVerdict::Blocked => ExitCode::from(1),
            GateVerdict::Warn => ExitCode::from(3),
        })
    }
}

fn print_check(check: &CheckResult) {
    let marker = if check.passed {
        "✓".green().to_string()
    } else if check.severity == Severity::Blocking {
        "✗".red().bold().to_string()
    } else {
        "!".yellow().bold().to_string()
    };
    println!("  {marker} {}: {}", check.name, check.message);
}

fn verdict_line(verdict: GateVerdict) -> String {
    match verdict {
        GateVerdict::Proceed => format!("{} {}", "✓".green(), verdict.label().green()),
        GateVerdict::Warn => format!("{} {}", "!".yellow().bold(), verdict.label().yellow()),
        GateVerdict::Blocked => format!("{} {}", "✗".red().bold(), verdict.label().red().bold()),
    }
}
