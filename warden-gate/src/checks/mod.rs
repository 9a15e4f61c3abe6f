//! The four preflight checks, one module per concern.
//!
//! Each check is a free function over the repository configuration and
//! domain table, returning a [`crate::CheckResult`]. Checks never abort the
//! battery: anything that goes wrong inside a check becomes a failed (or
//! warned) result.

pub mod containment;
pub mod session_lock;
pub mod structure;
pub mod sync_status;

pub use containment::check_containment;
pub use session_lock::check_session_lock;
pub use structure::check_structure;
pub use sync_status::check_sync_status;
