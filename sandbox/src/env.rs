//! Environment variables shared between the grader and the helper executables.

use crate::error::{Result, SandboxError};

pub const CGROUP_PATH: &str = "YAJUDGE_CGROUP_PATH";
pub const STACK_SIZE_LIMIT_MB: &str = "YAJUDGE_STACK_SIZE_LIMIT_MB";
pub const CPU_TIME_LIMIT_SEC: &str = "YAJUDGE_CPU_TIME_LIMIT_SEC";
pub const FD_COUNT_LIMIT: &str = "YAJUDGE_FD_COUNT_LIMIT";
pub const PROC_COUNT_LIMIT: &str = "YAJUDGE_PROC_COUNT_LIMIT";
pub const PROC_START_DELAY: &str = "YAJUDGE_PROC_START_DELAY";
pub const FORK_GUARD_FD: &str = "YAJUDGE_FORK_GUARD_FD";
pub const OVERLAY_LOWERDIR: &str = "YAJUDGE_OVERLAY_LOWERDIR";
pub const OVERLAY_UPPERDIR: &str = "YAJUDGE_OVERLAY_UPPERDIR";
pub const OVERLAY_WORKDIR: &str = "YAJUDGE_OVERLAY_WORKDIR";
pub const OVERLAY_MERGEDIR: &str = "YAJUDGE_OVERLAY_MERGEDIR";
/// Standard dynamic loader variable, used to load the fork guard wrapper.
pub const LD_PRELOAD: &str = "LD_PRELOAD";

/// Read a variable, treating an empty value the same as an unset one.
pub fn var(name: &'static str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub fn require(name: &'static str) -> Result<String> {
    var(name).ok_or(SandboxError::MissingEnv(name))
}

/// Read a plain unsigned integer.
pub fn u64_var(name: &'static str) -> Result<Option<u64>> {
    var(name)
        .map(|v| {
            v.trim().parse::<u64>().map_err(|_| SandboxError::InvalidEnv {
                name,
                value: v.clone(),
            })
        })
        .transpose()
}

/// Read a count that may carry a `k`, `m` or `g` suffix.
pub fn count_var(name: &'static str) -> Result<Option<u64>> {
    var(name)
        .map(|v| {
            parse_count(&v).ok_or_else(|| SandboxError::InvalidEnv {
                name,
                value: v.clone(),
            })
        })
        .transpose()
}

/// Parse `"100"`, `"4k"`, `"2M"`, `"1g"` into an integer count (powers of 1024).
pub fn parse_count(value: &str) -> Option<u64> {
    let value = value.trim();
    let (digits, multiplier) = match value.char_indices().last()? {
        (i, 'k' | 'K') => (value.get(..i)?, 1u64 << 10),
        (i, 'm' | 'M') => (value.get(..i)?, 1u64 << 20),
        (i, 'g' | 'G') => (value.get(..i)?, 1u64 << 30),
        _ => (value, 1),
    };
    digits.parse::<u64>().ok()?.checked_mul(multiplier)
}
