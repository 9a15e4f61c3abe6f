//! Subcommand implementations. Each module owns one clap `Args` struct with
//! a `run(self, &RepoConfig) -> Result<ExitCode>` entry point.

pub mod check;
pub mod gate;
pub mod lock;
pub mod status;
pub mod sync;
