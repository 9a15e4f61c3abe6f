//! `warden status` — session lock, change cache, and sync history at a
//! glance.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use warden_core::{lock, LockStatus, RepoConfig};
use warden_sync::{cache, reports};

/// Arguments for `warden status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusJson {
    lock: LockJson,
    last_run: Option<String>,
    domains: Vec<DomainJson>,
    last_sync: Option<LastSyncJson>,
}

#[derive(Serialize)]
struct LockJson {
    status: String,
    message: String,
    blocking: bool,
}

#[derive(Serialize)]
struct DomainJson {
    domain: String,
    files: usize,
    digest: String,
    hashed_at: String,
}

#[derive(Serialize)]
struct LastSyncJson {
    timestamp: String,
    mode: String,
    all_synced: bool,
    handlers: usize,
}

#[derive(Tabled)]
struct DomainTableRow {
    #[tabled(rename = "domain")]
    domain: String,
    #[tabled(rename = "files")]
    files: usize,
    #[tabled(rename = "digest")]
    digest: String,
    #[tabled(rename = "hashed at")]
    hashed_at: String,
}

impl StatusArgs {
    pub fn run(self, config: &RepoConfig) -> Result<ExitCode> {
        let lock_status = lock::status(config);
        let cache = cache::load(config);
        let history = reports::load(config);
        let last = history.last();

        if self.json {
            let payload = StatusJson {
                lock: LockJson {
                    status: lock_status.label().to_string(),
                    message: lock_status.message(),
                    blocking: lock_status.is_blocking(),
                },
                last_run: cache.last_run.map(|at| at.to_rfc3339()),
                domains: cache
                    .directories
                    .values()
                    .map(|state| DomainJson {
                        domain: state.name.0.clone(),
                        files: state.file_count,
                        digest: preview(&state.digest),
                        hashed_at: state.hashed_at.to_rfc3339(),
                    })
                    .collect(),
                last_sync: last.map(|report| LastSyncJson {
                    timestamp: report.timestamp.to_rfc3339(),
                    mode: report.mode.to_string(),
                    all_synced: report.all_synced,
                    handlers: report.sync_results.len(),
                }),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload)
                    .context("failed to serialize status JSON")?
            );
            return Ok(ExitCode::SUCCESS);
        }

        println!(
            "Warden v{} | {}",
            env!("CARGO_PKG_VERSION"),
            config.root.display()
        );
        println!("Session lock: {} — {}", lock_indicator(&lock_status), lock_status.message());

        match cache.last_run {
            Some(at) => println!("Change cache: last rebuilt {}", at.to_rfc3339()),
            None => println!("Change cache: never built — run `warden sync`"),
        }

        if cache.directories.is_empty() {
            println!("No domain digests recorded.");
        } else {
            let rows: Vec<DomainTableRow> = cache
                .directories
                .values()
                .map(|state| DomainTableRow {
                    domain: state.name.0.clone(),
                    files: state.file_count,
                    digest: preview(&state.digest),
                    hashed_at: state.hashed_at.to_rfc3339(),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{table}");
        }

        match last {
            Some(report) => {
                let marker = if report.all_synced {
                    "✓".green().to_string()
                } else {
                    "✗".red().bold().to_string()
                };
                println!(
                    "Last sync: {marker} {} ({} mode, {} handler(s), {:.1}s)",
                    report.timestamp.to_rfc3339(),
                    report.mode,
                    report.sync_results.len(),
                    report.total_duration_secs
                );
            }
            None => println!("Last sync: never"),
        }

        Ok(ExitCode::SUCCESS)
    }
}

fn preview(digest: &str) -> String {
    if digest.is_empty() {
        "(absent)".to_string()
    } else {
        digest.chars().take(12).collect()
    }
}

fn lock_indicator(status: &LockStatus) -> String {
    let label = status.label();
    match status {
        LockStatus::None => label.bright_black().to_string(),
        LockStatus::Complete { .. } => label.green().to_string(),
        LockStatus::Active { .. } => label.yellow().bold().to_string(),
        LockStatus::Stale { .. } | LockStatus::Corrupt { .. } => label.red().bold().to_string(),
    }
}
