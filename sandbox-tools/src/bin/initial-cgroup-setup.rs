//! Enable the memory and pids controllers on a cgroup and move a process
//! into it. Run once when the grader starts.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use nix::unistd::Pid;
use sandbox::Cgroup;

#[derive(Parser)]
#[command(name = "initial-cgroup-setup", version)]
struct Args {
    /// Cgroup directory delegated to the grader
    cgroup_root: PathBuf,
    /// Grader process to move into it
    pid: i32,
}

fn main() -> ExitCode {
    sandbox_tools::init_logging();
    let args: Args = sandbox_tools::parse_or_fail();
    let cgroup = Cgroup::new(args.cgroup_root);
    let result = cgroup
        .enable_controllers()
        .and_then(|()| cgroup.add_pid(Pid::from_raw(args.pid)));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => sandbox_tools::failure("cgroup setup failed", &e),
    }
}
