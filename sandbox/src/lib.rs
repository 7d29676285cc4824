//! Building blocks for running one untrusted process tree per grading job.
//!
//! The helper executables in `sandbox-tools` are thin wrappers around this
//! crate. They receive their parameters through the `YAJUDGE_*` variables
//! listed in [`env`].

mod capability;
mod cgroup;
pub mod env;
mod error;
mod fork_guard;
mod launcher;
mod limits;
mod overlay;
mod rlimits;
mod spec;

pub use capability::SysAdminGuard;
pub use cgroup::Cgroup;
pub use error::{Result, SandboxError};
pub use fork_guard::ForkGuard;
pub use launcher::Launcher;
pub use limits::Limits;
pub use overlay::{OverlayMount, is_mounted, unmount};
pub use rlimits::{NPROC_CEILING, PlannedLimit, ResourceLimits};
pub use spec::SandboxSpec;
