//! # warden-gate
//!
//! Session-start preflight gate.
//!
//! [`Gate::run`] executes a fixed battery of checks — session lock and
//! containment (blocking), sync status and skill structure (warning) — and
//! classifies the outcome as proceed, blocked, or proceed-with-warning.
//! The default fast path runs only the blocking checks so the gate stays
//! cheap enough to run at every session start.

pub mod checks;
pub mod error;
pub mod gate;
pub mod report;

pub use error::GateError;
pub use gate::{Gate, GateVerdict};
pub use report::{CheckResult, PreflightReport, Severity};
