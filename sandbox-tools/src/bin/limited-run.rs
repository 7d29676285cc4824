//! Join the job cgroup, apply resource limits and the fork budget, then exec
//! a command. All parameters come from `YAJUDGE_*` variables.

use std::process::ExitCode;

use clap::Parser;
use sandbox::Launcher;

#[derive(Parser)]
#[command(name = "limited-run", version)]
struct Args {
    /// Program to exec, followed by its arguments
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() -> ExitCode {
    sandbox_tools::init_logging();
    let args: Args = sandbox_tools::parse_or_abort();
    match Launcher::from_env() {
        Ok(launcher) => sandbox_tools::launch(launcher, &args.command),
        Err(e) => sandbox_tools::failure("invalid limits", &e),
    }
}
