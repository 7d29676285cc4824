//! Shared plumbing for the sandbox helper executables.
//!
//! Exit status contract: 0 on success, 1 on any setup or validation
//! failure, and an abort when required arguments are missing or the final
//! exec fails.

use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use sandbox::{Launcher, SandboxError};
use tracing::error;

/// Log to stderr only, leaving stdout to the program being launched.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_target(false)
        .init();
}

/// Parse arguments, aborting on a usage error.
pub fn parse_or_abort<T: Parser>() -> T {
    T::try_parse().unwrap_or_else(|e| {
        if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
            e.exit();
        }
        let _ = e.print();
        std::process::abort()
    })
}

/// Parse arguments, exiting with status 1 on a usage error.
pub fn parse_or_fail<T: Parser>() -> T {
    T::try_parse().unwrap_or_else(|e| {
        if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
            e.exit();
        }
        let _ = e.print();
        std::process::exit(1)
    })
}

pub fn failure(context: &str, err: &SandboxError) -> ExitCode {
    error!(error = %err, "{context}");
    ExitCode::FAILURE
}

/// Exec `command` through `launcher`. Only returns on a setup failure.
pub fn launch(launcher: Launcher, command: &[String]) -> ExitCode {
    let Some((program, args)) = command.split_first() else {
        error!("no command given");
        std::process::abort()
    };
    let err = match launcher.exec(program, args) {
        Ok(never) => match never {},
        Err(e) => e,
    };
    if err.is_exec_failure() {
        error!(error = %err, "exec failed");
        std::process::abort()
    }
    failure("sandbox setup failed", &err)
}
