//! `warden clear-lock` — remove the session lock.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use warden_core::{lock, LockError, LockStatus, RepoConfig};

/// Arguments for `warden clear-lock`.
#[derive(Args, Debug)]
pub struct ClearLockArgs {
    /// Clear even a fresh ACTIVE lock (the session may still be running).
    #[arg(long)]
    pub force: bool,
}

impl ClearLockArgs {
    pub fn run(self, config: &RepoConfig) -> Result<ExitCode> {
        match lock::clear(config, self.force) {
            Ok(LockStatus::None) => {
                println!("No session lock to clear.");
                Ok(ExitCode::SUCCESS)
            }
            Ok(previous) => {
                println!("{} session lock cleared (was {})", "✓".green(), previous.label());
                Ok(ExitCode::SUCCESS)
            }
            Err(LockError::ActiveLock { session_start }) => {
                eprintln!(
                    "{} lock is ACTIVE (session started {session_start}); the session may \
                     still be running. Re-run with --force to clear anyway.",
                    "refused:".yellow().bold()
                );
                Ok(ExitCode::from(1))
            }
            Err(err) => Err(err.into()),
        }
    }
}
