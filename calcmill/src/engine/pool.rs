//! Worker pool of compute engines for one computation type.

use super::calculator::Calculator;
use crate::computation::{ComputationResult, ComputationType, Request};
use crate::log::{Logger, NoOpLogger};
use crate::manager::{ComputationManager, Stopped};
use crate::{log_debug, log_info};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Configuration for an engine pool.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of worker threads (default: 2)
    pub workers: usize,
    /// Payload slice length between cancellation polls (default: 256)
    pub slice_len: usize,
    /// Artificial pause after each slice, to simulate long computations
    /// (default: none)
    pub slice_pause: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            slice_len: 256,
            slice_pause: Duration::ZERO,
        }
    }
}

impl EngineConfig {
    /// Set the number of worker threads.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the payload slice length between cancellation polls.
    pub fn with_slice_len(mut self, slice_len: usize) -> Self {
        self.slice_len = slice_len;
        self
    }

    /// Set the artificial pause after each slice.
    pub fn with_slice_pause(mut self, slice_pause: Duration) -> Self {
        self.slice_pause = slice_pause;
        self
    }
}

/// A pool of compute-engine threads bound to one computation type.
///
/// Each worker loops: pull the oldest pending request of the pool's type,
/// fold the payload through the [`Calculator`] slice by slice, then hand
/// the value back. Between slices the worker polls
/// [`should_continue`](ComputationManager::should_continue) and abandons
/// the work when it answers false. Workers exit when
/// [`stop`](ComputationManager::stop) releases them out of `fetch_work`.
///
/// # Example
///
/// ```
/// use calcmill::computation::{Computation, ComputationType};
/// use calcmill::engine::{default_calculator, EngineConfig, EnginePool};
/// use calcmill::manager::ComputationManager;
/// use std::sync::Arc;
///
/// let manager = Arc::new(ComputationManager::default());
/// let pool = EnginePool::spawn(
///     manager.clone(),
///     ComputationType::A,
///     default_calculator(ComputationType::A),
///     EngineConfig::default(),
/// );
///
/// let id = manager
///     .request_computation(Computation::new(ComputationType::A, vec![2.0, 3.0]))
///     .unwrap();
/// let result = manager.next_result().unwrap();
/// assert_eq!(result.id(), id);
/// assert_eq!(result.value(), 5.0);
///
/// manager.stop();
/// pool.join();
/// ```
pub struct EnginePool {
    kind: ComputationType,
    workers: Vec<JoinHandle<()>>,
    logger: Arc<dyn Logger>,
}

impl EnginePool {
    /// Spawn a pool of engine workers serving the given computation type.
    pub fn spawn(
        manager: Arc<ComputationManager>,
        kind: ComputationType,
        calculator: Arc<dyn Calculator>,
        config: EngineConfig,
    ) -> Self {
        Self::spawn_with_logger(manager, kind, calculator, config, Arc::new(NoOpLogger))
    }

    /// Spawn a pool with a logger for diagnostic output.
    pub fn spawn_with_logger(
        manager: Arc<ComputationManager>,
        kind: ComputationType,
        calculator: Arc<dyn Calculator>,
        config: EngineConfig,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let worker_count = config.workers.max(1);
        log_info!(logger, "starting {} engine worker(s) for type {}", worker_count, kind);

        let workers = (0..worker_count)
            .map(|worker_index| {
                let manager = Arc::clone(&manager);
                let calculator = Arc::clone(&calculator);
                let config = config.clone();
                let logger = Arc::clone(&logger);

                thread::Builder::new()
                    .name(format!("engine-{}-{}", kind, worker_index))
                    .spawn(move || {
                        Self::worker_loop(manager, kind, calculator, config, logger);
                    })
                    .expect("failed to spawn engine worker thread")
            })
            .collect();

        Self {
            kind,
            workers,
            logger,
        }
    }

    fn worker_loop(
        manager: Arc<ComputationManager>,
        kind: ComputationType,
        calculator: Arc<dyn Calculator>,
        config: EngineConfig,
        logger: Arc<dyn Logger>,
    ) {
        loop {
            let request = match manager.fetch_work(kind) {
                Ok(request) => request,
                Err(Stopped) => break,
            };

            match Self::run_request(&manager, &request, calculator.as_ref(), &config) {
                Some(value) => {
                    manager.provide_result(ComputationResult::new(request.id(), value));
                }
                None => {
                    log_debug!(logger, "abandoned request {} (type {})", request.id(), kind);
                }
            }
        }
        log_debug!(logger, "engine worker for type {} exiting", kind);
    }

    /// Fold the payload, polling for cancellation between slices.
    ///
    /// Returns `None` when the submission was aborted (or the buffer
    /// stopped) while computing.
    fn run_request(
        manager: &ComputationManager,
        request: &Request,
        calculator: &dyn Calculator,
        config: &EngineConfig,
    ) -> Option<f64> {
        let data = request.data();
        let mut acc = 0.0;

        for slice in data.chunks(config.slice_len.max(1)) {
            if !manager.should_continue(request.id()) {
                return None;
            }
            acc = calculator.accumulate(acc, slice);
            if !config.slice_pause.is_zero() {
                thread::sleep(config.slice_pause);
            }
        }

        Some(calculator.finish(acc, data.len()))
    }

    /// The computation type this pool serves.
    pub fn kind(&self) -> ComputationType {
        self.kind
    }

    /// Number of worker threads in the pool.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Wait for every worker to exit.
    ///
    /// Workers only exit once the manager has been stopped; call
    /// [`ComputationManager::stop`] first.
    pub fn join(self) {
        for worker in self.workers {
            let _ = worker.join();
        }
        log_debug!(self.logger, "engine pool for type {} joined", self.kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::computation::Computation;
    use crate::engine::calculator::{default_calculator, SumCalculator};
    use std::sync::mpsc;

    #[test]
    fn test_pool_computes_submitted_work() {
        let manager = Arc::new(ComputationManager::default());
        let pool = EnginePool::spawn(
            manager.clone(),
            ComputationType::A,
            Arc::new(SumCalculator),
            EngineConfig::default().with_workers(2),
        );

        let id = manager
            .request_computation(Computation::new(ComputationType::A, vec![1.0, 2.0, 3.0]))
            .unwrap();

        let result = manager.next_result().unwrap();
        assert_eq!(result.id(), id);
        assert_eq!(result.value(), 6.0);

        manager.stop();
        pool.join();
    }

    #[test]
    fn test_pool_drains_a_burst_larger_than_the_pool() {
        let manager = Arc::new(ComputationManager::default());
        let pool = EnginePool::spawn(
            manager.clone(),
            ComputationType::B,
            default_calculator(ComputationType::B),
            EngineConfig::default().with_workers(3),
        );

        let count = 10;
        for i in 0..count {
            manager
                .request_computation(Computation::new(ComputationType::B, vec![i as f64]))
                .unwrap();
        }

        for expected in 0..count {
            let result = manager.next_result().unwrap();
            assert_eq!(result.id().as_u64(), expected);
            assert_eq!(result.value(), expected as f64);
        }

        manager.stop();
        pool.join();
    }

    #[test]
    fn test_workers_exit_after_stop() {
        let manager = Arc::new(ComputationManager::default());
        let pool = EnginePool::spawn(
            manager.clone(),
            ComputationType::C,
            default_calculator(ComputationType::C),
            EngineConfig::default().with_workers(4),
        );

        let (done_sender, done_receiver) = mpsc::channel();
        thread::spawn(move || {
            pool.join();
            let _ = done_sender.send(());
        });

        manager.stop();
        done_receiver
            .recv_timeout(Duration::from_secs(5))
            .expect("workers should exit promptly after stop");
    }

    #[test]
    fn test_abort_mid_computation_discards_the_result() {
        // Signals when work starts, then crawls slice by slice.
        struct SlowCalculator {
            started: mpsc::Sender<()>,
        }

        impl Calculator for SlowCalculator {
            fn accumulate(&self, acc: f64, slice: &[f64]) -> f64 {
                let _ = self.started.send(());
                thread::sleep(Duration::from_millis(10));
                acc + slice.iter().sum::<f64>()
            }

            fn finish(&self, acc: f64, _len: usize) -> f64 {
                acc
            }
        }

        let manager = Arc::new(ComputationManager::default());
        let (started_sender, started_receiver) = mpsc::channel();
        let pool = EnginePool::spawn(
            manager.clone(),
            ComputationType::A,
            Arc::new(SlowCalculator {
                started: started_sender,
            }),
            // One value per slice: the worker polls between every element.
            EngineConfig::default().with_workers(1).with_slice_len(1),
        );

        let doomed = manager
            .request_computation(Computation::new(ComputationType::A, vec![1.0; 500]))
            .unwrap();
        started_receiver
            .recv_timeout(Duration::from_secs(5))
            .expect("worker should pick the request up");
        manager.abort_computation(doomed);

        // The worker abandons the aborted request and moves on to the next.
        let survivor = manager
            .request_computation(Computation::new(ComputationType::A, vec![2.0]))
            .unwrap();
        let result = manager.next_result().unwrap();
        assert_eq!(result.id(), survivor);
        assert_eq!(result.value(), 2.0);

        manager.stop();
        pool.join();
    }

    #[test]
    fn test_config_builders() {
        let config = EngineConfig::default()
            .with_workers(7)
            .with_slice_len(64)
            .with_slice_pause(Duration::from_millis(2));
        assert_eq!(config.workers, 7);
        assert_eq!(config.slice_len, 64);
        assert_eq!(config.slice_pause, Duration::from_millis(2));
    }

    #[test]
    fn test_pool_reports_kind_and_size() {
        let manager = Arc::new(ComputationManager::default());
        let pool = EnginePool::spawn(
            manager.clone(),
            ComputationType::B,
            Arc::new(SumCalculator),
            EngineConfig::default().with_workers(3),
        );
        assert_eq!(pool.kind(), ComputationType::B);
        assert_eq!(pool.worker_count(), 3);

        manager.stop();
        pool.join();
    }
}
