use std::path::PathBuf;

use tracing::warn;

use crate::cgroup::Cgroup;
use crate::env;
use crate::error::Result;
use crate::limits::Limits;
use crate::overlay::{self, OverlayMount};

/// Everything needed to start one job's process tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxSpec {
    pub lower_dir: PathBuf,
    pub upper_dir: PathBuf,
    pub work_dir: PathBuf,
    pub merge_dir: PathBuf,
    pub cgroup_path: Option<PathBuf>,
    pub limits: Limits,
    /// Shared object preloaded into the job so its `fork` calls draw on the
    /// fork guard budget.
    pub fork_guard_library: Option<PathBuf>,
}

impl SandboxSpec {
    /// Per-job layout under `job_dir`, layered over the shared system image.
    pub fn for_job(
        system_environment: impl Into<PathBuf>,
        job_dir: impl Into<PathBuf>,
        cgroup_path: Option<PathBuf>,
        limits: Limits,
    ) -> Self {
        let job_dir = job_dir.into();
        Self {
            lower_dir: system_environment.into(),
            upper_dir: job_dir.join("upperdir"),
            work_dir: job_dir.join("workdir"),
            merge_dir: job_dir.join("root"),
            cgroup_path,
            limits,
            fork_guard_library: None,
        }
    }

    pub fn with_fork_guard_library(mut self, library: Option<PathBuf>) -> Self {
        self.fork_guard_library = library;
        self
    }

    pub fn overlay(&self) -> OverlayMount {
        OverlayMount {
            lower: self.lower_dir.clone(),
            upper: self.upper_dir.clone(),
            work: self.work_dir.clone(),
            merge: self.merge_dir.clone(),
        }
    }

    pub fn cgroup(&self) -> Option<Cgroup> {
        self.cgroup_path.clone().map(Cgroup::new)
    }

    /// Create the writable layer directories.
    pub fn create_dirs(&self) -> Result<()> {
        for dir in [&self.upper_dir, &self.work_dir, &self.merge_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Environment for `overlay-mount` and `limited-run`.
    pub fn env(&self) -> Vec<(&'static str, String)> {
        let mut vars = vec![
            (env::OVERLAY_LOWERDIR, self.lower_dir.display().to_string()),
            (env::OVERLAY_UPPERDIR, self.upper_dir.display().to_string()),
            (env::OVERLAY_WORKDIR, self.work_dir.display().to_string()),
            (env::OVERLAY_MERGEDIR, self.merge_dir.display().to_string()),
        ];
        if let Some(cgroup) = &self.cgroup_path {
            vars.push((env::CGROUP_PATH, cgroup.display().to_string()));
        }
        vars.extend(self.limits.to_env());
        if let Some(library) = &self.fork_guard_library
            && self.limits.proc_count_limit > 0
        {
            vars.push((env::LD_PRELOAD, library.display().to_string()));
        }
        vars
    }

    /// Write the group-wide memory and process limits. Failures are logged:
    /// the per-process limits still apply.
    pub fn configure_cgroup(&self) {
        let Some(cgroup) = self.cgroup() else {
            return;
        };
        if let Err(e) = cgroup.set_memory_max(self.limits.memory_max_bytes()) {
            warn!(error = %e, "memory.max not set");
        }
        if let Err(e) = cgroup.set_pids_max(u64::from(self.limits.proc_count_limit)) {
            warn!(error = %e, "pids.max not set");
        }
    }

    /// Kill anything left in the cgroup and unmount the overlay if mounted.
    pub fn teardown(&self) -> Result<()> {
        if let Some(cgroup) = self.cgroup()
            && let Err(e) = cgroup.kill()
        {
            warn!(error = %e, "cgroup kill failed");
        }
        if overlay::is_mounted(&self.merge_dir)? {
            overlay::unmount(&self.merge_dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_layout_and_env() {
        let spec = SandboxSpec::for_job(
            "/srv/root",
            "/var/lib/yajudge/work/17",
            Some("/sys/fs/cgroup/yajudge/17".into()),
            Limits::default(),
        );
        assert_eq!(spec.merge_dir, PathBuf::from("/var/lib/yajudge/work/17/root"));
        let vars = spec.env();
        assert!(vars.contains(&(env::OVERLAY_LOWERDIR, "/srv/root".to_string())));
        assert!(vars.contains(&(
            env::OVERLAY_UPPERDIR,
            "/var/lib/yajudge/work/17/upperdir".to_string()
        )));
        assert!(vars.contains(&(env::CGROUP_PATH, "/sys/fs/cgroup/yajudge/17".to_string())));
        assert!(vars.contains(&(env::CPU_TIME_LIMIT_SEC, "1".to_string())));
    }

    #[test]
    fn fork_guard_library_is_preloaded_only_with_a_budget() {
        let spec = SandboxSpec::for_job("/", "/w/1", None, Limits::default())
            .with_fork_guard_library(Some("/usr/lib/yajudge/libyajudge_fork_guard.so".into()));
        assert!(spec.env().contains(&(
            env::LD_PRELOAD,
            "/usr/lib/yajudge/libyajudge_fork_guard.so".to_string()
        )));

        let unlimited = SandboxSpec {
            limits: Limits {
                proc_count_limit: 0,
                ..Limits::default()
            },
            ..spec
        };
        assert!(!unlimited.env().iter().any(|(k, _)| *k == env::LD_PRELOAD));
    }

    #[test]
    fn teardown_of_unmounted_spec_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let spec = SandboxSpec::for_job("/", dir.path(), None, Limits::default());
        spec.create_dirs().unwrap();
        assert!(spec.upper_dir.is_dir());
        spec.teardown().unwrap();
    }
}
