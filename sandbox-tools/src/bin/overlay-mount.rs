//! Mount (or with `-u` unmount) the job overlay described by the
//! `YAJUDGE_OVERLAY_*` variables. Intended to carry `cap_sys_admin+p`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sandbox::{OverlayMount, env};

#[derive(Parser)]
#[command(name = "overlay-mount", version)]
struct Args {
    /// Unmount instead of mount
    #[arg(short = 'u')]
    unmount: bool,
}

fn main() -> ExitCode {
    sandbox_tools::init_logging();
    let args: Args = sandbox_tools::parse_or_fail();

    let result = if args.unmount {
        env::require(env::OVERLAY_MERGEDIR).and_then(|merge| sandbox::unmount(&PathBuf::from(merge)))
    } else {
        OverlayMount::from_env().and_then(|overlay| overlay.mount())
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if args.unmount => sandbox_tools::failure("unmount failed", &e),
        Err(e) => sandbox_tools::failure("mount failed", &e),
    }
}
