//! Warden core library — domain types, handler registry, session lock, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes and report structs
//! - [`config`] — [`RepoConfig`], the explicit per-repository configuration
//! - [`registry`] — [`DomainSpec`] and the built-in domain table
//! - [`lock`] — session-lock state machine
//! - [`error`] — [`LockError`]

pub mod config;
pub mod error;
pub mod lock;
pub mod registry;
pub mod types;

pub use config::RepoConfig;
pub use error::LockError;
pub use lock::LockStatus;
pub use registry::{DomainSpec, ScriptStep};
pub use types::{DirectoryState, DomainName, PostHookReport, RunMode, SyncResult};
