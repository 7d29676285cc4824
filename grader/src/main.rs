mod benchmark;
mod capacity;
mod cmd;
mod config;
mod endpoint;
mod error;
mod grading_limits;
mod jobs;
mod logging;
mod master_link;
mod properties;
mod storage;

use std::fmt;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

struct Elapsed(Instant);

impl FormatTime for Elapsed {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let d = self.0.elapsed();
        let total_secs = d.as_secs();
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        let millis = d.subsec_millis();
        write!(w, "[{mins:02}:{secs:02}:{millis:03}]")
    }
}

pub(crate) fn init_tracing(level: Level, writer: BoxMakeWriter, ansi: bool) {
    tracing_subscriber::fmt()
        .with_timer(Elapsed(Instant::now()))
        .with_max_level(level)
        .with_writer(writer)
        .with_ansi(ansi)
        .init();
}

#[derive(Parser)]
#[command(name = "grader", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Connect to the master and grade submissions until stopped
    Start(cmd::StartArgs),
    /// Measure and print this node's performance rating
    Benchmark,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Start(args) => cmd::run_start(args),
        Command::Benchmark => {
            init_tracing(Level::INFO, BoxMakeWriter::new(std::io::stderr), false);
            cmd::run_benchmark();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
