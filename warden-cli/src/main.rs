//! Warden — repository governance CLI.
//!
//! # Usage
//!
//! ```text
//! warden check [--json]
//! warden sync [--force] [--only a,b]
//! warden status [--json]
//! warden clear-lock [--force]
//! warden gate [--validate] [--status] [--clear-lock] [--force] [--json]
//! ```
//!
//! Every subcommand operates on the repository at `--root` (default: the
//! current directory) and keeps its state under `<root>/.warden/`.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;

use commands::{
    check::CheckArgs, gate::GateArgs, lock::ClearLockArgs, status::StatusArgs, sync::SyncArgs,
};
use warden_core::RepoConfig;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "warden",
    version,
    about = "Detect content changes, orchestrate domain syncs, and gate session starts",
    long_about = None,
)]
struct Cli {
    /// Repository root to operate on.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Interpreter for domain sync scripts (default: python3).
    #[arg(long, global = true)]
    runtime: Option<String>,

    /// Verbose logging to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report which domains changed since their last sync (no side effects).
    Check(CheckArgs),

    /// Run sync handlers for changed domains and refresh the change cache.
    Sync(SyncArgs),

    /// Show the session lock, change cache, and recent sync history.
    Status(StatusArgs),

    /// Remove the session lock file.
    ClearLock(ClearLockArgs),

    /// Run the session-start preflight checks.
    Gate(GateArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = RepoConfig::new(&cli.root);
    if let Some(runtime) = cli.runtime {
        config = config.with_runtime(runtime);
    }

    let result = match cli.command {
        Commands::Check(args) => args.run(&config),
        Commands::Sync(args) => args.run(&config),
        Commands::Status(args) => args.run(&config),
        Commands::ClearLock(args) => args.run(&config),
        Commands::Gate(args) => args.run(&config),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}
