use std::convert::Infallible;
use std::ffi::CString;

use tracing::{debug, warn};

use crate::cgroup::Cgroup;
use crate::env;
use crate::error::{Result, SandboxError};
use crate::fork_guard::ForkGuard;
use crate::rlimits::ResourceLimits;

/// Replaces the current process with the target program once it is placed
/// in its cgroup and limited.
#[derive(Debug, Default)]
pub struct Launcher {
    cgroup: Option<Cgroup>,
    limits: Option<ResourceLimits>,
    proc_budget: Option<(u64, u64)>,
}

impl Launcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything `limited-run` reads from the environment: cgroup, POSIX
    /// limits and the process budget.
    pub fn from_env() -> Result<Self> {
        let mut launcher = Self::new()
            .with_cgroup(Cgroup::from_env())
            .resource_limits(ResourceLimits::from_env()?);
        if let Some(max_procs) = env::count_var(env::PROC_COUNT_LIMIT)? {
            let delay_ms = env::u64_var(env::PROC_START_DELAY)?.unwrap_or(0);
            launcher = launcher.proc_budget(max_procs, delay_ms);
        }
        Ok(launcher)
    }

    pub fn with_cgroup(mut self, cgroup: Option<Cgroup>) -> Self {
        self.cgroup = cgroup;
        self
    }

    pub fn resource_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn proc_budget(mut self, max_procs: u64, start_delay_ms: u64) -> Self {
        self.proc_budget = Some((max_procs, start_delay_ms));
        self
    }

    /// Join the cgroup, apply limits, arm the fork guard and exec `program`.
    ///
    /// Only returns on failure. [`SandboxError::is_exec_failure`] tells a
    /// failed exec apart from a setup failure.
    pub fn exec(self, program: &str, args: &[String]) -> Result<Infallible> {
        let argv = std::iter::once(program)
            .chain(args.iter().map(String::as_str))
            .map(cstring)
            .collect::<Result<Vec<_>>>()?;
        let filename = cstring(program)?;

        if let Some(cgroup) = &self.cgroup {
            cgroup.join()?;
            debug!(cgroup = %cgroup.path().display(), "joined cgroup");
            if let Some((max_procs, _)) = self.proc_budget
                && let Err(e) = cgroup.set_pids_max(max_procs)
            {
                warn!(error = %e, "pids.max not set, relying on fork guard");
            }
        }

        if let Some(limits) = &self.limits {
            limits.apply()?;
        }

        let mut extra_env = Vec::new();
        if let Some((max_procs, start_delay_ms)) = self.proc_budget {
            let guard = ForkGuard::create(max_procs, start_delay_ms)?;
            extra_env.push(guard.export_env());
            guard.into_inherited_fd();
        }

        let envp = build_env(std::env::vars(), &extra_env)?;
        nix::unistd::execvpe(&filename, &argv, &envp).map_err(|source| SandboxError::Exec {
            program: program.to_string(),
            source,
        })
    }
}

fn cstring(s: &str) -> Result<CString> {
    CString::new(s).map_err(|_| SandboxError::InvalidArgument(format!("{s:?} contains NUL")))
}

/// Current environment with `extra` entries replacing same-named variables.
fn build_env(
    current: impl Iterator<Item = (String, String)>,
    extra: &[(&'static str, String)],
) -> Result<Vec<CString>> {
    current
        .filter(|(k, _)| !extra.iter().any(|(name, _)| name == k))
        .chain(extra.iter().map(|(k, v)| (k.to_string(), v.clone())))
        .map(|(k, v)| cstring(&format!("{k}={v}")))
        .collect()
}
