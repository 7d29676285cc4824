use nix::sys::resource::{Resource, getrlimit, setrlimit};
use tracing::{debug, warn};

use crate::env;
use crate::error::{Result, SandboxError};

/// Soft ceiling on `RLIMIT_NPROC` applied to every limited process.
pub const NPROC_CEILING: u64 = 2000;

/// POSIX limits applied right before exec.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLimits {
    pub stack_size_mb: Option<u64>,
    pub cpu_time_sec: Option<u64>,
    pub fd_count: Option<u64>,
}

/// One `setrlimit` call, with soft and hard both set to `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedLimit {
    pub name: &'static str,
    pub resource: Resource,
    pub value: u64,
}

impl ResourceLimits {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            stack_size_mb: env::u64_var(env::STACK_SIZE_LIMIT_MB)?,
            cpu_time_sec: env::u64_var(env::CPU_TIME_LIMIT_SEC)?,
            fd_count: env::u64_var(env::FD_COUNT_LIMIT)?,
        })
    }

    /// Limits that `apply` will set, in order. Zero or missing values are skipped.
    pub fn plan(&self) -> Vec<PlannedLimit> {
        let candidates = [
            (
                "stack size",
                Resource::RLIMIT_STACK,
                self.stack_size_mb.and_then(|mb| mb.checked_mul(1024 * 1024)),
            ),
            ("CPU time", Resource::RLIMIT_CPU, self.cpu_time_sec),
            ("file descriptor count", Resource::RLIMIT_NOFILE, self.fd_count),
        ];
        candidates
            .into_iter()
            .filter_map(|(name, resource, value)| {
                value
                    .filter(|v| *v > 0)
                    .map(|value| PlannedLimit {
                        name,
                        resource,
                        value,
                    })
            })
            .collect()
    }

    /// Lower the process-count soft limit, then set every planned limit.
    ///
    /// The process-count step never fails; any other failure is returned
    /// with the name of the limit that could not be set.
    pub fn apply(&self) -> Result<()> {
        lower_nproc();
        for limit in self.plan() {
            let value = limit.value as libc::rlim_t;
            setrlimit(limit.resource, value, value).map_err(|source| SandboxError::Limit {
                limit: limit.name,
                value: limit.value,
                source,
            })?;
            debug!(limit = limit.name, value = limit.value, "limit applied");
        }
        Ok(())
    }
}

fn lower_nproc() {
    let hard = match getrlimit(Resource::RLIMIT_NPROC) {
        Ok((_, hard)) => hard,
        Err(e) => {
            warn!(error = %e, "cannot read process count limit");
            return;
        }
    };
    let soft = (NPROC_CEILING as libc::rlim_t).min(hard);
    if let Err(e) = setrlimit(Resource::RLIMIT_NPROC, soft, hard) {
        warn!(error = %e, "cannot lower process count limit");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_is_converted_to_bytes() {
        let limits = ResourceLimits {
            stack_size_mb: Some(8),
            ..Default::default()
        };
        let plan = limits.plan();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].resource, Resource::RLIMIT_STACK);
        assert_eq!(plan[0].value, 8_388_608);
    }

    #[test]
    fn zero_and_missing_values_are_skipped() {
        let limits = ResourceLimits {
            stack_size_mb: Some(0),
            cpu_time_sec: Some(2),
            fd_count: None,
        };
        let plan = limits.plan();
        assert_eq!(
            plan,
            vec![PlannedLimit {
                name: "CPU time",
                resource: Resource::RLIMIT_CPU,
                value: 2,
            }]
        );
    }

    #[test]
    fn apply_in_child_sets_soft_and_hard() {
        // setrlimit is process-wide, so exercise it in a throwaway child.
        // SAFETY: the child only makes async-signal-safe calls before _exit.
        match unsafe { nix::unistd::fork() }.unwrap() {
            nix::unistd::ForkResult::Child => {
                let limits = ResourceLimits {
                    fd_count: Some(16),
                    ..Default::default()
                };
                let ok = limits.apply().is_ok()
                    && getrlimit(Resource::RLIMIT_NOFILE).ok() == Some((16, 16));
                // SAFETY: terminate the forked child without running destructors.
                unsafe { libc::_exit(if ok { 0 } else { 1 }) }
            }
            nix::unistd::ForkResult::Parent { child } => {
                let status = nix::sys::wait::waitpid(child, None).unwrap();
                assert_eq!(status, nix::sys::wait::WaitStatus::Exited(child, 0));
            }
        }
    }
}
