use serde::Deserialize;

use crate::env;

/// Resource limits bound to a single grading job.
///
/// A zero value means "not set" when merging overrides, so a problem can
/// override only the limits it cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub stack_size_limit_mb: u32,
    pub memory_max_limit_mb: u32,
    pub cpu_time_limit_sec: u32,
    pub real_time_limit_sec: u32,
    pub proc_count_limit: u32,
    pub fd_count_limit: u32,
    pub stdout_size_limit_mb: u32,
    pub stderr_size_limit_mb: u32,
    pub allow_network: bool,
    pub new_proc_delay_msec: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            stack_size_limit_mb: 4,
            memory_max_limit_mb: 64,
            cpu_time_limit_sec: 1,
            real_time_limit_sec: 5,
            proc_count_limit: 20,
            fd_count_limit: 20,
            stdout_size_limit_mb: 1,
            stderr_size_limit_mb: 1,
            allow_network: false,
            new_proc_delay_msec: 0,
        }
    }
}

fn override_nonzero(base: &mut u32, other: u32) {
    if other != 0 {
        *base = other;
    }
}

impl Limits {
    /// Every limit unset, the identity for [`Limits::update_from`].
    pub const UNSET: Limits = Limits {
        stack_size_limit_mb: 0,
        memory_max_limit_mb: 0,
        cpu_time_limit_sec: 0,
        real_time_limit_sec: 0,
        proc_count_limit: 0,
        fd_count_limit: 0,
        stdout_size_limit_mb: 0,
        stderr_size_limit_mb: 0,
        allow_network: false,
        new_proc_delay_msec: 0,
    };

    /// Take every non-zero field of `other`, and `allow_network` if it is set.
    pub fn update_from(&mut self, other: &Limits) {
        override_nonzero(&mut self.stack_size_limit_mb, other.stack_size_limit_mb);
        override_nonzero(&mut self.memory_max_limit_mb, other.memory_max_limit_mb);
        override_nonzero(&mut self.cpu_time_limit_sec, other.cpu_time_limit_sec);
        override_nonzero(&mut self.real_time_limit_sec, other.real_time_limit_sec);
        override_nonzero(&mut self.proc_count_limit, other.proc_count_limit);
        override_nonzero(&mut self.fd_count_limit, other.fd_count_limit);
        override_nonzero(&mut self.stdout_size_limit_mb, other.stdout_size_limit_mb);
        override_nonzero(&mut self.stderr_size_limit_mb, other.stderr_size_limit_mb);
        override_nonzero(&mut self.new_proc_delay_msec, other.new_proc_delay_msec);
        if other.allow_network {
            self.allow_network = true;
        }
    }

    pub fn updated_with(mut self, other: &Limits) -> Self {
        self.update_from(other);
        self
    }

    pub fn memory_max_bytes(&self) -> u64 {
        u64::from(self.memory_max_limit_mb) * 1024 * 1024
    }

    /// Variables consumed by `limited-run` and the fork guard.
    pub fn to_env(&self) -> Vec<(&'static str, String)> {
        let mut vars = Vec::new();
        let mut push = |name: &'static str, value: u32| {
            if value > 0 {
                vars.push((name, value.to_string()));
            }
        };
        push(env::STACK_SIZE_LIMIT_MB, self.stack_size_limit_mb);
        push(env::CPU_TIME_LIMIT_SEC, self.cpu_time_limit_sec);
        push(env::FD_COUNT_LIMIT, self.fd_count_limit);
        push(env::PROC_COUNT_LIMIT, self.proc_count_limit);
        push(env::PROC_START_DELAY, self.new_proc_delay_msec);
        vars
    }
}
