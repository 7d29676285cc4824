use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("Value {0} not set")]
    MissingEnv(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("failed to set {limit} limit to {value}: {source}")]
    Limit {
        limit: &'static str,
        value: u64,
        source: nix::Error,
    },

    #[error("cgroup file {}: {source}", path.display())]
    Cgroup {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to mount {}: {source}", target.display())]
    Mount { target: PathBuf, source: nix::Error },

    #[error("failed to unmount {}: {source}", target.display())]
    Unmount { target: PathBuf, source: nix::Error },

    #[error("{} is already mounted", .0.display())]
    AlreadyMounted(PathBuf),

    #[error(
        "CAP_SYS_ADMIN is not available: {0}. Ensure you have executed 'sudo setcap cap_sys_admin+p' on this binary"
    )]
    Capability(String),

    #[error("fork guard: {0}")]
    ForkGuard(nix::Error),

    #[error("exec {program}: {source}")]
    Exec { program: String, source: nix::Error },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SandboxError {
    /// True when the failure happened at the final `exec` step, after the
    /// sandbox itself was fully set up.
    pub fn is_exec_failure(&self) -> bool {
        matches!(self, SandboxError::Exec { .. })
    }
}

pub type Result<T> = std::result::Result<T, SandboxError>;
