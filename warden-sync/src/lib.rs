//! # warden-sync
//!
//! Content-hash change detection and sync orchestration.
//!
//! Build an [`Orchestrator`] over a domain table and call
//! [`Orchestrator::check`] for a side-effect-free sync-status probe, or
//! [`Orchestrator::run`] to invoke the collaborator handler chains for
//! changed (or forced) domains.

pub mod cache;
pub mod error;
pub mod hasher;
pub mod orchestrator;
pub mod reports;
pub mod runner;

pub use error::SyncError;
pub use orchestrator::{CheckReport, DomainChange, Orchestrator};
pub use runner::{ProcessRunner, RunOutcome, ScriptRunner};
