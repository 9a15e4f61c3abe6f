//! `warden check` — side-effect-free change detection.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use warden_core::{registry, RepoConfig};
use warden_sync::{Orchestrator, ProcessRunner};

/// Arguments for `warden check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct CheckJson {
    all_synced: bool,
    changed: Vec<String>,
    domains: Vec<DomainJson>,
}

#[derive(Serialize)]
struct DomainJson {
    domain: String,
    changed: bool,
    files: usize,
    digest: String,
}

#[derive(Tabled)]
struct CheckTableRow {
    #[tabled(rename = "domain")]
    domain: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "files")]
    files: usize,
    #[tabled(rename = "digest")]
    digest: String,
}

impl CheckArgs {
    pub fn run(self, config: &RepoConfig) -> Result<ExitCode> {
        let domains = registry::builtin_domains();
        let runner = ProcessRunner::new(config);
        let report = Orchestrator::new(config, &domains, &runner)
            .check()
            .context("change detection failed")?;

        if self.json {
            let payload = CheckJson {
                all_synced: report.all_synced(),
                changed: report
                    .changed_domains()
                    .into_iter()
                    .map(|name| name.0.clone())
                    .collect(),
                domains: report
                    .changes
                    .iter()
                    .map(|(name, change)| DomainJson {
                        domain: name.0.clone(),
                        changed: change.changed,
                        files: change.state.file_count,
                        digest: digest_preview(&change.state.digest),
                    })
                    .collect(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize check JSON")?
            );
        } else {
            let rows: Vec<CheckTableRow> = report
                .changes
                .iter()
                .map(|(name, change)| CheckTableRow {
                    domain: name.0.clone(),
                    status: if change.changed {
                        "CHANGED".yellow().bold().to_string()
                    } else {
                        "SYNCED".green().to_string()
                    },
                    files: change.state.file_count,
                    digest: digest_preview(&change.state.digest),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{table}");

            let changed = report.changed_domains();
            if changed.is_empty() {
                println!("{} all domains in sync", "✓".green());
            } else {
                println!(
                    "{} {} domain(s) need sync — run `warden sync`",
                    "!".yellow().bold(),
                    changed.len()
                );
            }
        }

        Ok(if report.all_synced() {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        })
    }
}

fn digest_preview(digest: &str) -> String {
    if digest.is_empty() {
        "(absent)".to_string()
    } else {
        digest.chars().take(12).collect()
    }
}
