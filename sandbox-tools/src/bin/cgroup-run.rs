//! Join the cgroup named by `YAJUDGE_CGROUP_PATH` and exec a command.

use std::process::ExitCode;

use clap::Parser;
use sandbox::{Cgroup, Launcher};

#[derive(Parser)]
#[command(name = "cgroup-run", version)]
struct Args {
    /// Program to exec, followed by its arguments
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() -> ExitCode {
    sandbox_tools::init_logging();
    let args: Args = sandbox_tools::parse_or_abort();
    let launcher = Launcher::new().with_cgroup(Cgroup::from_env());
    sandbox_tools::launch(launcher, &args.command)
}
