//! Simulation runner: drives clients, engines, and a collector against
//! one shared buffer.

use crate::workload::WorkloadGenerator;
use calcmill::computation::{ComputationType, RequestId};
use calcmill::engine::{default_calculator, EngineConfig, EnginePool};
use calcmill::log::Logger;
use calcmill::manager::{ComputationManager, Stopped};
use calcmill::{log_info, log_warn};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Parameters of one simulation run.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Number of client threads
    pub clients: usize,
    /// Submissions per client
    pub requests_per_client: usize,
    /// Engine workers per computation type
    pub engines_per_type: usize,
    /// Bound on each per-type pending queue
    pub max_queue_size: usize,
    /// Payload length of generated computations
    pub payload_len: usize,
    /// Payload slice length between engine cancellation polls
    pub slice_len: usize,
    /// Artificial engine pause per slice
    pub slice_pause: Duration,
    /// Chance (percent) that a client aborts one of its live submissions
    /// after each submit
    pub abort_percent: u8,
    /// Workload RNG seed
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            clients: 4,
            requests_per_client: 25,
            engines_per_type: 2,
            max_queue_size: 10,
            payload_len: 4096,
            slice_len: 256,
            slice_pause: Duration::ZERO,
            abort_percent: 0,
            seed: 42,
        }
    }
}

/// Outcome of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// Submissions accepted by the buffer
    pub submitted: usize,
    /// Abort calls issued by clients
    pub aborted: usize,
    /// Results the collector received
    pub delivered: usize,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

/// How long to wait for in-flight work to drain before forcing shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(60);

/// Run a full simulation: spawn engine pools and client threads, collect
/// results until the buffer drains, then stop it and reap every thread.
pub fn run_simulation(config: &SimulationConfig, logger: &Arc<dyn Logger>) -> SimulationReport {
    let started = Instant::now();
    let manager = Arc::new(
        ComputationManager::new(config.max_queue_size).with_logger(Arc::clone(logger)),
    );

    log_info!(
        logger,
        "simulation: {} client(s) x {} request(s), {} engine(s) per type, queue bound {}",
        config.clients,
        config.requests_per_client,
        config.engines_per_type,
        config.max_queue_size
    );

    let pools: Vec<EnginePool> = ComputationType::ALL
        .into_iter()
        .map(|kind| {
            EnginePool::spawn_with_logger(
                manager.clone(),
                kind,
                default_calculator(kind),
                EngineConfig::default()
                    .with_workers(config.engines_per_type)
                    .with_slice_len(config.slice_len)
                    .with_slice_pause(config.slice_pause),
                Arc::clone(logger),
            )
        })
        .collect();

    let collector = {
        let manager = manager.clone();
        let logger = Arc::clone(logger);
        thread::spawn(move || {
            let mut delivered = 0usize;
            let mut last_id: Option<RequestId> = None;
            loop {
                match manager.next_result() {
                    Ok(result) => {
                        if last_id.is_some_and(|last| last >= result.id()) {
                            log_warn!(logger, "result {} delivered out of order", result.id());
                        }
                        last_id = Some(result.id());
                        delivered += 1;
                    }
                    Err(Stopped) => break,
                }
            }
            delivered
        })
    };

    let clients: Vec<_> = (0..config.clients)
        .map(|client_index| {
            let manager = manager.clone();
            let config = config.clone();
            thread::Builder::new()
                .name(format!("client-{}", client_index))
                .spawn(move || client_loop(&manager, &config, client_index))
                .expect("failed to spawn client thread")
        })
        .collect();

    let mut submitted = 0usize;
    let mut aborted = 0usize;
    for client in clients {
        let (client_submitted, client_aborted) = client.join().expect("client thread panicked");
        submitted += client_submitted;
        aborted += client_aborted;
    }

    // Let the surviving work drain through engines and collector.
    let drain_started = Instant::now();
    while !manager.is_idle() {
        if drain_started.elapsed() > DRAIN_TIMEOUT {
            log_warn!(logger, "drain timed out; stopping with work outstanding");
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }

    manager.stop();
    for pool in pools {
        pool.join();
    }
    let delivered = collector.join().expect("collector thread panicked");

    SimulationReport {
        submitted,
        aborted,
        delivered,
        elapsed: started.elapsed(),
    }
}

/// Submit the client's workload, occasionally aborting a live submission.
fn client_loop(
    manager: &ComputationManager,
    config: &SimulationConfig,
    client_index: usize,
) -> (usize, usize) {
    // Distinct seed per client, derived from the run seed.
    let seed = config
        .seed
        .wrapping_add(0x9e37_79b9u64.wrapping_mul(client_index as u64 + 1));
    let mut workload = WorkloadGenerator::new(seed, config.payload_len);

    let mut live: Vec<RequestId> = Vec::new();
    let mut submitted = 0usize;
    let mut aborted = 0usize;

    for _ in 0..config.requests_per_client {
        let id = match manager.request_computation(workload.next_computation()) {
            Ok(id) => id,
            Err(Stopped) => break,
        };
        submitted += 1;
        live.push(id);

        if !live.is_empty() && workload.should_abort(config.abort_percent) {
            let victim = live.swap_remove(workload.pick(live.len()));
            manager.abort_computation(victim);
            aborted += 1;
        }
    }

    (submitted, aborted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calcmill::log::NoOpLogger;

    fn quiet() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger)
    }

    #[test]
    fn test_everything_is_delivered_without_aborts() {
        let config = SimulationConfig {
            clients: 2,
            requests_per_client: 8,
            engines_per_type: 1,
            payload_len: 16,
            ..SimulationConfig::default()
        };

        let report = run_simulation(&config, &quiet());
        assert_eq!(report.submitted, 16);
        assert_eq!(report.aborted, 0);
        assert_eq!(report.delivered, 16);
    }

    #[test]
    fn test_aborts_only_reduce_delivery() {
        let config = SimulationConfig {
            clients: 3,
            requests_per_client: 10,
            engines_per_type: 1,
            payload_len: 16,
            abort_percent: 50,
            ..SimulationConfig::default()
        };

        let report = run_simulation(&config, &quiet());
        assert_eq!(report.submitted, 30);
        assert!(report.delivered + report.aborted >= report.submitted);
        assert!(report.delivered <= report.submitted);
    }
}
