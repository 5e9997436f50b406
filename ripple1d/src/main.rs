/*
This code is part of the ripple1d geospatial reach-modeling engine.
License: MIT
*/

//! `ripple1d` is the command-line entry point for the reach-scoped
//! hydraulic-model factory: it launches the HTTP job server and its
//! worker pool, reports on a running instance, and stops one (spec §6
//! "CLI surface").

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use ripple1d_common::config::Config;
use ripple1d_server::{build_router, spawn_workers, AppState, JobStore, ProcessRegistry};

#[derive(Parser)]
#[command(name = "ripple1d", version, about = "Reach-scoped hydraulic-model factory")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to the working directory holding `ripple1d.json`, the job
    /// queue, and sub-model data.
    #[arg(long, global = true, default_value = ".")]
    working_directory: PathBuf,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Launches the job server and worker pool.
    Start {
        #[arg(long, default_value_t = 5000)]
        port: u16,
        /// Number of worker processes/threads (spec §5 default 1).
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Stops a running server started with `start`.
    Stop,
    /// Reports whether a server is running and its worker count.
    Status,
}

fn pid_file(working_directory: &std::path::Path) -> PathBuf {
    working_directory.join("ripple1d.pid")
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    ripple1d_common::logging::init_logging(cli.verbose);

    let result = match cli.command {
        Command::Start { port, workers } => start(&cli.working_directory, port, workers),
        Command::Stop => stop(&cli.working_directory),
        Command::Status => status(&cli.working_directory),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}

fn start(working_directory: &std::path::Path, port: u16, workers: Option<usize>) -> ripple1d_common::Result<()> {
    let config_path = working_directory.join("ripple1d.json");
    let mut config = Config::load(&config_path)?;
    config.working_directory = working_directory.display().to_string();
    if let Some(n) = workers {
        config.num_workers = n;
    }
    config.save(&config_path)?;

    std::fs::write(pid_file(working_directory), std::process::id().to_string())?;

    let store = Arc::new(JobStore::new(config.queue_path())?);
    let registry = Arc::new(ProcessRegistry::new());
    let num_workers = if config.num_workers == 0 { num_cpus::get().max(1) } else { config.num_workers };
    let _handles = spawn_workers(store.clone(), registry.clone(), num_workers, std::time::Duration::from_millis(500));

    tracing::info!(port, num_workers, "starting ripple1d job server");
    let app_state = AppState::new(store, registry);
    let router = build_router(app_state);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| ripple1d_common::RippleError::Other(format!("failed to start async runtime: {e}")))?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
            .await
            .map_err(ripple1d_common::RippleError::Io)?;
        axum::serve(listener, router).await.map_err(|e| ripple1d_common::RippleError::Other(format!("server error: {e}")))
    })
}

fn stop(working_directory: &std::path::Path) -> ripple1d_common::Result<()> {
    let path = pid_file(working_directory);
    let pid = std::fs::read_to_string(&path).map_err(|_| ripple1d_common::RippleError::Other("no running server found".to_string()))?;
    let pid: i32 = pid.trim().parse().map_err(|_| ripple1d_common::RippleError::Other("invalid pid file".to_string()))?;

    #[cfg(unix)]
    {
        // SAFETY: `kill` with a signal only sends a termination request to
        // an existing pid; no memory is touched on the Rust side.
        let result = unsafe { libc_kill(pid, 15) };
        if result != 0 {
            return Err(ripple1d_common::RippleError::Other(format!("failed to signal pid {pid}")));
        }
    }
    #[cfg(not(unix))]
    {
        let _ = pid;
        tracing::warn!("stop is only implemented for unix targets");
    }

    std::fs::remove_file(&path).ok();
    Ok(())
}

#[cfg(unix)]
extern "C" {
    #[link_name = "kill"]
    fn libc_kill(pid: i32, sig: i32) -> i32;
}

fn status(working_directory: &std::path::Path) -> ripple1d_common::Result<()> {
    let path = pid_file(working_directory);
    match std::fs::read_to_string(&path) {
        Ok(pid) => println!("ripple1d server running (pid {})", pid.trim()),
        Err(_) => println!("ripple1d server is not running"),
    }
    Ok(())
}
