//! CalcMill CLI - simulation harness for the computation buffer.
//!
//! Spawns a configurable population of client threads and typed engine
//! pools against one shared `ComputationManager`, runs the workload to
//! completion, and reports what was submitted, aborted, and delivered.

mod error;
mod runner;
mod workload;

use calcmill::log::{Logger, TracingLogger};
use calcmill::logging;
use clap::Parser;
use error::CliError;
use runner::{run_simulation, SimulationConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "calcmill")]
#[command(version = calcmill::VERSION)]
#[command(about = "Deferred computation brokering simulation", long_about = None)]
struct Cli {
    /// Number of client threads submitting work
    #[arg(long, default_value_t = 4)]
    clients: usize,

    /// Submissions per client
    #[arg(long, default_value_t = 25)]
    requests_per_client: usize,

    /// Engine workers per computation type
    #[arg(long, default_value_t = 2)]
    engines_per_type: usize,

    /// Bound on each per-type pending queue
    #[arg(long, default_value_t = 10)]
    max_queue_size: usize,

    /// Payload length of generated computations
    #[arg(long, default_value_t = 4096)]
    payload_len: usize,

    /// Payload slice length between engine cancellation polls
    #[arg(long, default_value_t = 256)]
    slice_len: usize,

    /// Artificial engine pause per slice, in milliseconds
    #[arg(long, default_value_t = 0)]
    slice_pause_ms: u64,

    /// Chance (percent) that a client aborts a live submission after
    /// each submit
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=100))]
    abort_percent: u8,

    /// Workload RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Enable debug-level logging
    #[arg(long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        err.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    validate(&cli)?;

    let _logging_guard = logging::init_logging(
        logging::default_log_dir(),
        logging::default_log_file(),
        cli.debug,
    )
    .map_err(|e| CliError::LoggingInit(e.to_string()))?;

    info!("CalcMill v{}", calcmill::VERSION);

    let config = SimulationConfig {
        clients: cli.clients,
        requests_per_client: cli.requests_per_client,
        engines_per_type: cli.engines_per_type,
        max_queue_size: cli.max_queue_size,
        payload_len: cli.payload_len,
        slice_len: cli.slice_len,
        slice_pause: Duration::from_millis(cli.slice_pause_ms),
        abort_percent: cli.abort_percent,
        seed: cli.seed,
    };

    let logger: Arc<dyn Logger> = Arc::new(TracingLogger::new());
    let report = run_simulation(&config, &logger);

    info!(
        "done in {:.2?}: {} submitted, {} abort call(s), {} delivered",
        report.elapsed, report.submitted, report.aborted, report.delivered
    );
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), CliError> {
    if cli.clients == 0 {
        return Err(CliError::InvalidOption("clients must be at least 1".into()));
    }
    if cli.engines_per_type == 0 {
        return Err(CliError::InvalidOption(
            "engines-per-type must be at least 1".into(),
        ));
    }
    if cli.max_queue_size == 0 {
        return Err(CliError::InvalidOption(
            "max-queue-size must be at least 1".into(),
        ));
    }
    Ok(())
}
