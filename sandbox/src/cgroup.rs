use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use nix::unistd::Pid;

use crate::env;
use crate::error::{Result, SandboxError};

const SUBTREE_CONTROL: &str = "cgroup.subtree_control";
const PROCS: &str = "cgroup.procs";
const KILL: &str = "cgroup.kill";
const PIDS_MAX: &str = "pids.max";
const MEMORY_MAX: &str = "memory.max";

/// A cgroup v2 directory. All writes go to files that already exist; nothing
/// under the cgroup filesystem is ever created implicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cgroup {
    path: PathBuf,
}

impl Cgroup {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The cgroup named by `YAJUDGE_CGROUP_PATH`, if any.
    pub fn from_env() -> Option<Self> {
        env::var(env::CGROUP_PATH).map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delegate the memory and pids controllers to child groups.
    pub fn enable_controllers(&self) -> Result<()> {
        self.append(SUBTREE_CONTROL, "+memory +pids ")
    }

    pub fn add_pid(&self, pid: Pid) -> Result<()> {
        self.append(PROCS, &format!("{pid}\n"))
    }

    /// Move the calling process into this group.
    pub fn join(&self) -> Result<()> {
        self.add_pid(Pid::this())
    }

    pub fn set_pids_max(&self, max: u64) -> Result<()> {
        self.append(PIDS_MAX, &max.to_string())
    }

    pub fn set_memory_max(&self, bytes: u64) -> Result<()> {
        self.append(MEMORY_MAX, &bytes.to_string())
    }

    /// Kill every process in the group.
    pub fn kill(&self) -> Result<()> {
        self.append(KILL, "1")
    }

    fn append(&self, file: &str, content: &str) -> Result<()> {
        let path = self.path.join(file);
        let wrap = |source| SandboxError::Cgroup {
            path: path.clone(),
            source,
        };
        let mut f = OpenOptions::new().append(true).open(&path).map_err(wrap)?;
        f.write_all(content.as_bytes()).map_err(wrap)
    }
}
