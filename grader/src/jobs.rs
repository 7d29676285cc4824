//! Per-submission job dispatch.
//!
//! Each submission accepted by the master link gets a worker slot, its files
//! unpacked into a private work directory and a sandbox layout with its own
//! cgroup. Grading itself runs inside that sandbox through the helper binaries.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use sandbox::{Limits, SandboxSpec};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use yajudge_proto::{SolutionStatus, Submission};

use crate::capacity::WorkerSlots;
use crate::config::GraderConfig;
use crate::error::GraderResult;
use crate::grading_limits;
use crate::storage::Storage;

#[derive(Clone)]
pub struct JobsManager {
    slots: WorkerSlots,
    storage: Storage,
    system_environment: PathBuf,
    cgroup_root: Option<PathBuf>,
    default_limits: Limits,
    fork_guard_library: Option<PathBuf>,
    in_progress: Arc<Mutex<HashSet<i64>>>,
    finished: mpsc::UnboundedSender<Submission>,
}

impl JobsManager {
    /// Every processed submission is sent to `finished` for reporting.
    pub fn new(
        config: &GraderConfig,
        slots: WorkerSlots,
        storage: Storage,
        finished: mpsc::UnboundedSender<Submission>,
    ) -> Self {
        Self {
            slots,
            storage,
            system_environment: config.locations.system_environment.clone(),
            cgroup_root: config.locations.cgroup_root.clone(),
            default_limits: config.default_limits,
            fork_guard_library: config.locations.fork_guard_library.clone(),
            in_progress: Arc::default(),
            finished,
        }
    }

    pub fn in_progress(&self) -> usize {
        self.lock_in_progress().len()
    }

    fn lock_in_progress(&self) -> std::sync::MutexGuard<'_, HashSet<i64>> {
        self.in_progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Take submissions from `rx` until it closes or `cancel` fires, then
    /// wait for running jobs.
    pub async fn serve(self, mut rx: mpsc::UnboundedReceiver<Submission>, cancel: CancellationToken) {
        let mut jobs = JoinSet::new();
        loop {
            let submission = tokio::select! {
                _ = cancel.cancelled() => break,
                next = rx.recv() => match next {
                    Some(s) => s,
                    None => break,
                },
                Some(done) = jobs.join_next(), if !jobs.is_empty() => {
                    if let Err(e) = done {
                        error!(error = %e, "job task failed");
                    }
                    continue;
                }
            };

            let id = submission.id;
            if !self.lock_in_progress().insert(id) {
                error!(id, "submission already in progress");
                continue;
            }
            let permit = tokio::select! {
                _ = cancel.cancelled() => {
                    self.lock_in_progress().remove(&id);
                    break;
                }
                permit = self.slots.acquire() => match permit {
                    Ok(p) => p,
                    Err(_) => {
                        self.lock_in_progress().remove(&id);
                        break;
                    }
                },
            };

            debug!(id, running = self.in_progress(), "submission accepted");
            let manager = self.clone();
            jobs.spawn(async move {
                let _permit = permit;
                let mut report = submission.clone();
                let result = {
                    let manager = manager.clone();
                    tokio::task::spawn_blocking(move || manager.prepare(&submission)).await
                };
                match result {
                    Ok(Ok(())) => info!(id, "submission processed"),
                    Ok(Err(e)) => {
                        error!(id, error = %e, "submission failed");
                        mark_check_failed(&mut report, &e.to_string());
                    }
                    Err(e) => {
                        error!(id, error = %e, "submission task panicked");
                        mark_check_failed(&mut report, &e.to_string());
                    }
                }
                manager.lock_in_progress().remove(&id);
                if manager.finished.send(report).is_err() {
                    warn!(id, "master link is gone, result not reported");
                }
            });
        }

        if !jobs.is_empty() {
            info!(running = jobs.len(), "waiting for running jobs");
        }
        while let Some(done) = jobs.join_next().await {
            if let Err(e) = done {
                error!(error = %e, "job task failed");
            }
        }
    }

    /// Lay out the submission's work directory and sandbox, then release them.
    fn prepare(&self, submission: &Submission) -> GraderResult<()> {
        let root = self.storage.store_submission(submission)?;
        let cgroup = self
            .cgroup_root
            .as_ref()
            .map(|base| base.join(format!("{:06}", submission.id)));
        let spec = SandboxSpec::for_job(
            &self.system_environment,
            &root,
            cgroup,
            self.limits_for(submission),
        )
        .with_fork_guard_library(self.fork_guard_library.clone());
        spec.create_dirs()?;
        if let Some(path) = &spec.cgroup_path {
            std::fs::create_dir_all(path)?;
            spec.configure_cgroup();
        }
        debug!(
            id = submission.id,
            root = %root.display(),
            vars = spec.env().len(),
            "sandbox prepared"
        );

        // Graders run here: `overlay-mount` followed by `limited-run` for each
        // step, with `spec.env()` as their environment. Teardown below expects
        // the overlay to be unmounted again.

        let teardown = spec.teardown();
        if let Some(path) = &spec.cgroup_path
            && let Err(e) = std::fs::remove_dir(path)
        {
            warn!(path = %path.display(), error = %e, "cgroup not removed");
        }
        teardown?;
        Ok(())
    }

    /// Node defaults updated with the limits of the cached problem.
    fn limits_for(&self, submission: &Submission) -> Limits {
        let Some(course) = &submission.course else {
            return self.default_limits;
        };
        if submission.problem_id.is_empty() {
            return self.default_limits;
        }
        match self
            .storage
            .load_problem(&course.data_id, &submission.problem_id)
        {
            Ok(problem) => grading_limits::for_problem(self.default_limits, problem.as_ref()),
            Err(e) => {
                warn!(
                    id = submission.id,
                    problem = %submission.problem_id,
                    error = %e,
                    "problem limits unavailable, using defaults"
                );
                self.default_limits
            }
        }
    }
}

fn mark_check_failed(submission: &mut Submission, reason: &str) {
    submission.set_status(SolutionStatus::CheckFailed);
    submission.build_error_log = reason.to_string();
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use yajudge_proto::{
        Course, File, FileSet, GradingLimits, GradingOptions, ProblemContentResponse,
        ProblemData,
    };

    use super::*;
    use crate::config::{EndpointsConfig, JobsConfig, LocationsConfig, LogConfig, RpcConfig};

    fn manager(dir: &std::path::Path, workers: usize) -> JobsManager {
        manager_reporting(dir, workers).0
    }

    fn manager_reporting(
        dir: &std::path::Path,
        workers: usize,
    ) -> (JobsManager, mpsc::UnboundedReceiver<Submission>) {
        std::fs::create_dir_all(dir.join("work")).unwrap();
        let config = GraderConfig {
            log: LogConfig::default(),
            rpc: RpcConfig {
                endpoints: EndpointsConfig {
                    courses_content: "grpc://m".into(),
                    submissions: "grpc://m".into(),
                },
                private_token: "t".into(),
                private_token_file: None,
            },
            jobs: JobsConfig::default(),
            locations: LocationsConfig {
                working_directory: dir.join("work"),
                cache_directory: dir.join("cache"),
                system_environment: "/".into(),
                cgroup_root: None,
                fork_guard_library: None,
            },
            default_limits: Limits::default(),
            config_dir: dir.to_path_buf(),
        };
        let storage = Storage::new(&config.locations);
        let (finished, results) = mpsc::unbounded_channel();
        let jobs = JobsManager::new(&config, WorkerSlots::new(workers), storage, finished);
        (jobs, results)
    }

    fn submission(id: i64) -> Submission {
        Submission {
            id,
            solution_files: Some(FileSet {
                files: vec![File {
                    name: "main.c".into(),
                    data: b"int main(){}".to_vec(),
                    ..Default::default()
                }],
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn submissions_are_unpacked_and_slots_released() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = manager(dir.path(), 2);
        let slots = jobs.slots.clone();
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(jobs.clone().serve(rx, cancel.clone()));

        tx.send(submission(7)).unwrap();
        tx.send(submission(8)).unwrap();
        drop(tx);
        tokio::time::timeout(Duration::from_secs(10), handle)
            .await
            .unwrap()
            .unwrap();

        for id in ["000007", "000008"] {
            let root = dir.path().join("work").join(id);
            assert!(root.join("upperdir/build/main.c").is_file());
            assert!(root.join("workdir").is_dir());
            assert!(root.join("root").is_dir());
        }
        assert_eq!(jobs.in_progress(), 0);
        assert_eq!(slots.active_tasks(), 0);
    }

    #[tokio::test]
    async fn processed_submissions_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (jobs, mut results) = manager_reporting(dir.path(), 2);
        let mut broken = submission(9);
        broken.solution_files = Some(FileSet {
            files: vec![File {
                name: "../evil".into(),
                ..Default::default()
            }],
        });

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(submission(3)).unwrap();
        tx.send(broken).unwrap();
        drop(tx);
        tokio::time::timeout(Duration::from_secs(10), jobs.serve(rx, CancellationToken::new()))
            .await
            .unwrap();

        let mut reported = Vec::new();
        while let Ok(done) = results.try_recv() {
            reported.push(done);
        }
        reported.sort_by_key(|s| s.id);
        assert_eq!(reported.len(), 2);
        assert_eq!(reported[0].id, 3);
        assert_ne!(reported[0].status(), SolutionStatus::CheckFailed);
        assert!(reported[0].build_error_log.is_empty());
        assert_eq!(reported[1].id, 9);
        assert_eq!(reported[1].status(), SolutionStatus::CheckFailed);
        assert!(
            reported[1].build_error_log.contains("../evil"),
            "{}",
            reported[1].build_error_log
        );
    }

    #[test]
    fn cached_problem_limits_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = manager(dir.path(), 1);
        jobs.storage
            .store_problem(&ProblemContentResponse {
                course_data_id: "c1".into(),
                problem_id: "week1:sum".into(),
                last_modified: 1,
                data: Some(ProblemData {
                    grading_options: Some(GradingOptions {
                        limits: Some(GradingLimits {
                            memory_max_limit_mb: 256,
                            proc_count_limit: -1,
                            ..Default::default()
                        }),
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .unwrap();

        let mut sub = submission(1);
        sub.course = Some(Course {
            data_id: "c1".into(),
            ..Default::default()
        });
        sub.problem_id = "week1:sum".into();
        assert_eq!(
            jobs.limits_for(&sub),
            Limits {
                memory_max_limit_mb: 256,
                ..Limits::default()
            }
        );

        sub.problem_id = "week1:missing".into();
        assert_eq!(jobs.limits_for(&sub), Limits::default());
        sub.problem_id = "..:..:etc".into();
        assert_eq!(jobs.limits_for(&sub), Limits::default());
        assert_eq!(jobs.limits_for(&submission(2)), Limits::default());
    }

    #[tokio::test]
    async fn duplicate_submission_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = manager(dir.path(), 1);
        jobs.lock_in_progress().insert(5);

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(submission(5)).unwrap();
        drop(tx);
        jobs.clone().serve(rx, CancellationToken::new()).await;

        assert!(!dir.path().join("work/000005").exists());
        assert_eq!(jobs.in_progress(), 1);
    }

    #[tokio::test]
    async fn cancel_stops_intake() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = manager(dir.path(), 1);
        let (_tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), jobs.serve(rx, cancel))
            .await
            .unwrap();
    }
}
