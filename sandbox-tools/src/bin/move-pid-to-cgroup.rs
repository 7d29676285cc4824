//! Move a process into a cgroup.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use nix::unistd::Pid;
use sandbox::Cgroup;

#[derive(Parser)]
#[command(name = "move-pid-to-cgroup", version)]
struct Args {
    /// Cgroup directory
    cgroup_root: PathBuf,
    /// Process to move
    pid: i32,
}

fn main() -> ExitCode {
    sandbox_tools::init_logging();
    let args: Args = sandbox_tools::parse_or_fail();
    match Cgroup::new(args.cgroup_root).add_pid(Pid::from_raw(args.pid)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => sandbox_tools::failure("cannot move process", &e),
    }
}
