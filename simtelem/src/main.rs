//! # simtelem
//!
//! Real-time ETL engine for vehicular simulation telemetry: ingests
//! per-cycle snapshots from one or more highways, runs them through a
//! concurrent Extract/Transform/Enrich pipeline, and publishes the result
//! to an interactive terminal dashboard.
//!
//! # Usage
//!
//! ```bash
//! # Watch one or more file-drop directories (default transport)
//! simtelem --dir data/I-95 --dir data/US-1
//!
//! # Connect to an RPC-stream producer instead
//! simtelem --rpc 127.0.0.1:9000
//!
//! # Run for at most 60 seconds, then shut down automatically
//! simtelem --dir data --timeout 60
//! ```

#![deny(warnings)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use simtelem_common::config::{ConfigLoader, EngineConfig};
use simtelem_common::consts;
use simtelem_dashboard::DashboardDeps;
use simtelem_etl::{Shared, lifecycle};
use simtelem_transport::{CycleSource, FileDropTransport, RpcTransport};

/// simtelem - real-time vehicular telemetry ETL engine
#[derive(Parser, Debug)]
#[command(name = "simtelem")]
#[command(version)]
#[command(about = "Ingests simulated highway telemetry and publishes it to a live dashboard")]
struct Args {
    /// File-drop directory to watch (repeatable). Defaults to `data` if
    /// neither `--dir` nor `--rpc` is given.
    #[arg(long = "dir", action = clap::ArgAction::Append)]
    dirs: Vec<PathBuf>,

    /// Connect to an RPC-stream producer at this address instead of
    /// watching file-drop directories.
    #[arg(long)]
    rpc: Option<String>,

    /// Load engine settings from a TOML config file. Explicit CLI flags
    /// below still take precedence over anything the file sets.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of Extract/Transform/Enrich worker threads (minimum 5).
    #[arg(long)]
    threads: Option<usize>,

    /// Bounded capacity of the enrichment queue.
    #[arg(long)]
    queue_size: Option<usize>,

    /// Shut down automatically after this many seconds. `0` runs until `q`
    /// is pressed or the process receives a shutdown signal.
    #[arg(long)]
    timeout: Option<u64>,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,

    /// Enable verbose (debug) logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_tracing(&args);

    if let Err(err) = run(args) {
        error!("simtelem exited with an error: {err}");
        std::process::exit(1);
    }
    Ok(())
}

/// Settings resolved from the optional `--config` file, overridden by
/// whichever CLI flags were actually passed.
struct ResolvedSettings {
    threads: usize,
    queue_size: usize,
    timeout: u64,
    map_size: usize,
}

fn resolve_settings(args: &Args) -> Result<ResolvedSettings, Box<dyn std::error::Error>> {
    let file_config = match &args.config {
        Some(path) => {
            let config = EngineConfig::load(path)?;
            config.validate()?;
            Some(config)
        }
        None => None,
    };

    Ok(ResolvedSettings {
        threads: args
            .threads
            .or(file_config.as_ref().map(|c| c.num_threads))
            .unwrap_or(consts::MIN_THREADS),
        queue_size: args
            .queue_size
            .or(file_config.as_ref().map(|c| c.enrichment_queue_size))
            .unwrap_or(consts::DEFAULT_QUEUE_SIZE),
        timeout: args.timeout.unwrap_or(0),
        map_size: file_config
            .as_ref()
            .map(|c| c.initial_map_size)
            .unwrap_or(consts::DEFAULT_MAP_SIZE),
    })
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    info!("simtelem v{} starting...", env!("CARGO_PKG_VERSION"));

    let settings = resolve_settings(&args)?;
    if settings.threads < consts::MIN_THREADS {
        return Err(format!("threads={} is below the minimum of {}", settings.threads, consts::MIN_THREADS).into());
    }

    let shared = Shared::new(settings.threads, settings.map_size, settings.queue_size, Duration::from_millis(5));

    ctrlc::set_handler({
        let shared = Arc::clone(&shared);
        move || {
            info!("received shutdown signal");
            shared.request_shutdown();
        }
    })?;

    let _timeout_handle = lifecycle::spawn_timeout_shutdown(Arc::clone(&shared), Duration::from_secs(settings.timeout));

    let mut transport = build_transport(&args)?;

    let orchestrator_handle = {
        let shared = Arc::clone(&shared);
        std::thread::spawn(move || {
            let mut orchestrator = simtelem_etl::IngestOrchestrator::new();
            orchestrator.run(transport.as_mut(), &shared);
        })
    };

    let deps = DashboardDeps {
        index: &shared.vehicle_index,
        highways: &shared.highways,
        buffers: &shared.buffers,
        state: &shared.dashboard,
        draw_signal: &shared.draw_signal,
    };
    let shared_for_dashboard = Arc::clone(&shared);
    simtelem_dashboard::run(&deps, || shared.should_exit(), move || shared_for_dashboard.request_shutdown())?;

    orchestrator_handle.join().expect("orchestrator thread panicked");

    info!("simtelem shutdown complete");
    Ok(())
}

fn build_transport(args: &Args) -> Result<Box<dyn CycleSource>, Box<dyn std::error::Error>> {
    if let Some(addr) = &args.rpc {
        info!(address = %addr, "binding RPC-stream transport");
        return Ok(Box::new(RpcTransport::bind(addr)?));
    }

    let dirs = if args.dirs.is_empty() { vec![PathBuf::from("data")] } else { args.dirs.clone() };
    info!(dirs = ?dirs, "watching file-drop transport");
    Ok(Box::new(FileDropTransport::new(dirs, consts::N_FILES)))
}

fn setup_tracing(args: &Args) {
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
