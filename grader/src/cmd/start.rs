use std::path::PathBuf;

use clap::Args;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::benchmark;
use crate::capacity::WorkerSlots;
use crate::config::{self, GraderConfig, Overrides};
use crate::error::GraderResult;
use crate::jobs::JobsManager;
use crate::logging;
use crate::master_link::MasterLink;
use crate::properties::service_properties;
use crate::storage::Storage;

#[derive(Args)]
pub struct StartArgs {
    /// Path to the grader YAML config
    #[arg(long, short = 'C')]
    config: PathBuf,
    /// Node name reported to the master (overrides config)
    #[arg(long, short = 'N', env = "YAJUDGE_GRADER_NAME")]
    name: Option<String>,
    /// Log destination: stdout, stderr or a file path (overrides config)
    #[arg(long, short = 'L')]
    log_path: Option<String>,
    /// Log level (overrides config)
    #[arg(long, short = 'l')]
    log_level: Option<String>,
}

/// Load config, install logging and serve until SIGINT or SIGTERM.
pub fn run_start(args: StartArgs) -> GraderResult<()> {
    let mut config = config::load(&args.config)?;
    config.apply_overrides(Overrides {
        name: args.name,
        log_path: args.log_path,
        log_level: args.log_level,
    });

    crate::init_tracing(
        logging::level(&config.log.level)?,
        logging::writer(&config.log.path)?,
        logging::is_terminal(&config.log.path),
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.jobs.workers + 1)
        .enable_all()
        .build()?;
    runtime.block_on(serve(config))
}

async fn serve(config: GraderConfig) -> GraderResult<()> {
    let endpoints = config.endpoints()?;

    let rating = match tokio::task::spawn_blocking(benchmark::performance_rating).await {
        Ok(rating) => rating,
        Err(e) => {
            warn!(error = %e, "benchmark failed, reporting zero rating");
            0.0
        }
    };
    info!(
        name = %config.jobs.name,
        workers = config.jobs.workers,
        rating,
        "grader started"
    );

    let slots = WorkerSlots::new(config.jobs.workers);
    let storage = Storage::new(&config.locations);
    let properties = service_properties(
        &config.jobs.name,
        config.jobs.arch_specific_only,
        config.jobs.workers,
        rating,
    );
    let (dispatch_tx, dispatch_rx) = mpsc::unbounded_channel();
    let (finished_tx, finished_rx) = mpsc::unbounded_channel();
    let link = MasterLink::new(
        endpoints,
        &config.rpc.private_token,
        properties,
        slots.clone(),
        storage.clone(),
        dispatch_tx,
        finished_rx,
    )?;
    let jobs = JobsManager::new(&config, slots, storage, finished_tx);

    let cancel = CancellationToken::new();
    let link_task = tokio::spawn(link.run(cancel.clone()));
    let jobs_task = tokio::spawn(jobs.serve(dispatch_rx, cancel.clone()));

    let mut sigterm = signal(SignalKind::terminate()).ok();
    let mut sigint = signal(SignalKind::interrupt()).ok();
    tokio::select! {
        _ = recv_signal(&mut sigterm) => info!("received SIGTERM, stopping"),
        _ = recv_signal(&mut sigint) => info!("received SIGINT, stopping"),
    }
    cancel.cancel();

    if let Err(e) = link_task.await {
        error!(error = %e, "master link task failed");
    }
    if let Err(e) = jobs_task.await {
        error!(error = %e, "jobs task failed");
    }
    info!("grader stopped");
    Ok(())
}

/// Await a signal if registered, or pend forever if registration failed.
async fn recv_signal(sig: &mut Option<tokio::signal::unix::Signal>) {
    match sig {
        Some(s) => {
            s.recv().await;
        }
        None => std::future::pending().await,
    }
}
