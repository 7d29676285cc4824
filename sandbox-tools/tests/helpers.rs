#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::unreachable
)]

use std::os::unix::process::ExitStatusExt;
use std::process::{Command, Output};

use nix::sys::signal::Signal;

const YAJUDGE_VARS: [&str; 11] = [
    "YAJUDGE_CGROUP_PATH",
    "YAJUDGE_STACK_SIZE_LIMIT_MB",
    "YAJUDGE_CPU_TIME_LIMIT_SEC",
    "YAJUDGE_FD_COUNT_LIMIT",
    "YAJUDGE_PROC_COUNT_LIMIT",
    "YAJUDGE_PROC_START_DELAY",
    "YAJUDGE_FORK_GUARD_FD",
    "YAJUDGE_OVERLAY_LOWERDIR",
    "YAJUDGE_OVERLAY_UPPERDIR",
    "YAJUDGE_OVERLAY_WORKDIR",
    "YAJUDGE_OVERLAY_MERGEDIR",
];

fn helper(bin: &str) -> Command {
    let mut cmd = Command::new(bin);
    for var in YAJUDGE_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

#[test]
fn limited_run_applies_stack_limit() {
    let out = helper(env!("CARGO_BIN_EXE_limited-run"))
        .env("YAJUDGE_STACK_SIZE_LIMIT_MB", "8")
        .args(["sh", "-c", "ulimit -s"])
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(stdout(&out), "8192");
}

#[test]
fn limited_run_applies_fd_limit_to_soft_and_hard() {
    let out = helper(env!("CARGO_BIN_EXE_limited-run"))
        .env("YAJUDGE_FD_COUNT_LIMIT", "32")
        .args(["sh", "-c", "ulimit -n; ulimit -H -n"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(stdout(&out), "32\n32");
}

#[test]
fn limited_run_exports_fork_guard_when_budget_set() {
    let out = helper(env!("CARGO_BIN_EXE_limited-run"))
        .env("YAJUDGE_PROC_COUNT_LIMIT", "50")
        .args(["sh", "-c", "echo ${YAJUDGE_FORK_GUARD_FD:-missing}"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let fd = stdout(&out);
    assert!(fd.parse::<i32>().is_ok(), "unexpected fd {fd:?}");
}

#[test]
fn limited_run_rejects_malformed_limit() {
    let out = helper(env!("CARGO_BIN_EXE_limited-run"))
        .env("YAJUDGE_CPU_TIME_LIMIT_SEC", "fast")
        .args(["true"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn limited_run_aborts_when_exec_fails() {
    let out = helper(env!("CARGO_BIN_EXE_limited-run"))
        .args(["/nonexistent/program"])
        .output()
        .unwrap();
    assert_eq!(out.status.signal(), Some(Signal::SIGABRT as i32));
}

#[test]
fn cgroup_run_aborts_without_command() {
    let out = helper(env!("CARGO_BIN_EXE_cgroup-run")).output().unwrap();
    assert_eq!(out.status.signal(), Some(Signal::SIGABRT as i32));
}

#[test]
fn cgroup_run_without_cgroup_just_execs() {
    let out = helper(env!("CARGO_BIN_EXE_cgroup-run"))
        .args(["echo", "-n", "hello"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(out.stdout, b"hello");
}

#[test]
fn cgroup_run_fails_when_cgroup_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let out = helper(env!("CARGO_BIN_EXE_cgroup-run"))
        .env("YAJUDGE_CGROUP_PATH", dir.path().join("absent"))
        .args(["true"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn move_pid_to_cgroup_appends_pid() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cgroup.procs"), b"").unwrap();
    let out = helper(env!("CARGO_BIN_EXE_move-pid-to-cgroup"))
        .arg(dir.path())
        .arg("4242")
        .output()
        .unwrap();
    assert!(out.status.success());
    let procs = std::fs::read_to_string(dir.path().join("cgroup.procs")).unwrap();
    assert_eq!(procs, "4242\n");
}

#[test]
fn move_pid_to_cgroup_usage_errors_exit_one() {
    let dir = tempfile::tempdir().unwrap();
    let out = helper(env!("CARGO_BIN_EXE_move-pid-to-cgroup"))
        .arg(dir.path())
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));

    let out = helper(env!("CARGO_BIN_EXE_move-pid-to-cgroup"))
        .arg(dir.path())
        .arg("1")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn initial_cgroup_setup_enables_controllers_then_moves_pid() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cgroup.procs"), b"").unwrap();
    std::fs::write(dir.path().join("cgroup.subtree_control"), b"").unwrap();
    let out = helper(env!("CARGO_BIN_EXE_initial-cgroup-setup"))
        .arg(dir.path())
        .arg("99")
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("cgroup.subtree_control")).unwrap(),
        "+memory +pids "
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("cgroup.procs")).unwrap(),
        "99\n"
    );
}

#[test]
fn overlay_mount_requires_directories() {
    let out = helper(env!("CARGO_BIN_EXE_overlay-mount")).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    let out = helper(env!("CARGO_BIN_EXE_overlay-mount"))
        .arg("-u")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
}
