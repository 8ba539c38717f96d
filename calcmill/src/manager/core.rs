//! The shared computation buffer.

use super::error::Stopped;
use super::traits::{ClientInterface, ComputeEngineInterface};
use crate::computation::{Computation, ComputationResult, ComputationType, Request, RequestId};
use crate::log::{Logger, NoOpLogger};
use crate::{log_debug, log_info};
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};

/// Default bound on each per-type pending queue.
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 10;

/// Ledger entry for one live submission.
///
/// Created when the submission is accepted, filled at most once by
/// `provide_result`, removed by delivery or abort. Ledger order equals
/// submission order, which is what makes result delivery independent of
/// the order engines finish in.
struct Slot {
    id: RequestId,
    value: Option<f64>,
}

/// State guarded by the buffer's single mutex.
struct Shared {
    /// Pending requests, one bounded FIFO per computation type.
    pending: [VecDeque<Request>; ComputationType::COUNT],
    /// All live submissions in submission order, delivery head at the front.
    ledger: VecDeque<Slot>,
    next_id: u64,
    stopped: bool,
}

impl Shared {
    fn assign_id(&mut self) -> RequestId {
        let id = RequestId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn head_ready(&self) -> bool {
        self.ledger.front().is_some_and(|slot| slot.value.is_some())
    }

    fn remove_slot(&mut self, id: RequestId) {
        if let Some(position) = self.ledger.iter().position(|slot| slot.id == id) {
            self.ledger.remove(position);
        }
    }
}

/// Shared coordination buffer between clients and compute engines.
///
/// Clients submit typed computations and collect results in submission
/// order; engines pull the oldest pending request of their type, compute,
/// and hand the value back. All operations run mutually exclusively under
/// one mutex; the blocking ones wait on condition variables, re-checking
/// their condition in a loop after every wake:
///
/// ```text
///              request_computation          fetch_work
/// ┌─────────┐ ───────────────────▶ ┌──────┐ ─────────▶ ┌─────────┐
/// │ clients │   (space_available)  │queues│ (work_     │ engines │
/// │         │                      ├──────┤  available)│         │
/// │         │ ◀─────────────────── │ledger│ ◀───────── │         │
/// └─────────┘     next_result      └──────┘ provide_result
///                (result_ready)
/// ```
///
/// Each per-type queue is bounded; submitters wait for space, engines wait
/// for work, and result consumers wait for the oldest surviving submission
/// to be filled. [`stop`](ComputationManager::stop) releases every waiter:
/// a single signal per condition is enough because each waiter that wakes
/// into the stopped state passes the signal along before failing.
///
/// # Example
///
/// ```
/// use calcmill::computation::{Computation, ComputationResult, ComputationType};
/// use calcmill::manager::ComputationManager;
///
/// let manager = ComputationManager::default();
///
/// let id = manager.request_computation(
///     Computation::new(ComputationType::A, vec![1.0, 2.0]),
/// )?;
///
/// // An engine thread would do this part.
/// let request = manager.fetch_work(ComputationType::A)?;
/// let sum: f64 = request.data().iter().sum();
/// manager.provide_result(ComputationResult::new(request.id(), sum));
///
/// let result = manager.next_result()?;
/// assert_eq!(result.id(), id);
/// assert_eq!(result.value(), 3.0);
/// # Ok::<(), calcmill::manager::Stopped>(())
/// ```
pub struct ComputationManager {
    shared: Mutex<Shared>,
    /// Engines waiting for work of one type (one condition per type).
    work_available: [Condvar; ComputationType::COUNT],
    /// Clients waiting for queue space of one type (one condition per type).
    space_available: [Condvar; ComputationType::COUNT],
    /// Consumers waiting for the delivery head to be filled.
    result_ready: Condvar,
    max_queue_size: usize,
    logger: Arc<dyn Logger>,
}

impl ComputationManager {
    /// Create a buffer whose per-type pending queues hold at most
    /// `max_queue_size` requests.
    ///
    /// # Panics
    ///
    /// Panics when `max_queue_size` is zero.
    pub fn new(max_queue_size: usize) -> Self {
        assert!(max_queue_size > 0, "queue bound must be positive");
        Self {
            shared: Mutex::new(Shared {
                pending: std::array::from_fn(|_| VecDeque::new()),
                ledger: VecDeque::new(),
                next_id: 0,
                stopped: false,
            }),
            work_available: std::array::from_fn(|_| Condvar::new()),
            space_available: std::array::from_fn(|_| Condvar::new()),
            result_ready: Condvar::new(),
            max_queue_size,
            logger: Arc::new(NoOpLogger),
        }
    }

    /// Attach a logger for diagnostic output.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// The bound on each per-type pending queue.
    pub fn max_queue_size(&self) -> usize {
        self.max_queue_size
    }

    /// Submit a computation; see [`ClientInterface::request_computation`].
    pub fn request_computation(&self, computation: Computation) -> Result<RequestId, Stopped> {
        let kind = computation.kind();
        let index = kind.index();

        let mut shared = self.shared.lock().unwrap();
        while !shared.stopped && shared.pending[index].len() >= self.max_queue_size {
            shared = self.space_available[index].wait(shared).unwrap();
        }
        if shared.stopped {
            // Pass the wake along so every blocked submitter sees the shutdown.
            self.space_available[index].notify_one();
            return Err(Stopped);
        }

        let id = shared.assign_id();
        shared.ledger.push_back(Slot { id, value: None });
        shared.pending[index].push_back(Request::new(id, computation));
        self.work_available[index].notify_one();
        drop(shared);

        log_debug!(self.logger, "accepted request {} (type {})", id, kind);
        Ok(id)
    }

    /// Cancel a submission; see [`ClientInterface::abort_computation`].
    pub fn abort_computation(&self, id: RequestId) {
        let mut shared = self.shared.lock().unwrap();

        // Still queued: drop the queue entry and its ledger slot together.
        for kind in ComputationType::ALL {
            let index = kind.index();
            if let Some(position) = shared.pending[index].iter().position(|r| r.id() == id) {
                shared.pending[index].remove(position);
                shared.remove_slot(id);
                self.space_available[index].notify_one();
                // Removing an undelivered head can expose a filled slot behind it.
                self.result_ready.notify_one();
                drop(shared);

                log_debug!(self.logger, "aborted queued request {} (type {})", id, kind);
                return;
            }
        }

        // In flight or already computed: drop the ledger slot.
        if let Some(position) = shared.ledger.iter().position(|slot| slot.id == id) {
            let in_flight = shared.ledger[position].value.is_none();
            shared.ledger.remove(position);
            if in_flight {
                // A consumer may have been parked on this very head.
                self.result_ready.notify_one();
            }
            drop(shared);

            log_debug!(self.logger, "aborted request {}", id);
        }
        // Unknown ids lost a race with delivery or an earlier abort: no-op.
    }

    /// Take the next deliverable result; see [`ClientInterface::next_result`].
    pub fn next_result(&self) -> Result<ComputationResult, Stopped> {
        let mut shared = self.shared.lock().unwrap();
        while !shared.stopped && !shared.head_ready() {
            shared = self.result_ready.wait(shared).unwrap();
        }
        if shared.stopped {
            self.result_ready.notify_one();
            return Err(Stopped);
        }

        let slot = shared
            .ledger
            .pop_front()
            .expect("head checked filled under lock");
        let value = slot.value.expect("head checked filled under lock");
        if shared.head_ready() {
            // The next result may already be waiting for another consumer.
            self.result_ready.notify_one();
        }
        Ok(ComputationResult::new(slot.id, value))
    }

    /// Take the oldest pending request of a type; see
    /// [`ComputeEngineInterface::fetch_work`].
    pub fn fetch_work(&self, kind: ComputationType) -> Result<Request, Stopped> {
        let index = kind.index();

        let mut shared = self.shared.lock().unwrap();
        while !shared.stopped && shared.pending[index].is_empty() {
            shared = self.work_available[index].wait(shared).unwrap();
        }
        if shared.stopped {
            self.work_available[index].notify_one();
            return Err(Stopped);
        }

        // The ledger slot stays in place, empty: the work is now in flight.
        let request = shared.pending[index]
            .pop_front()
            .expect("queue checked non-empty under lock");
        self.space_available[index].notify_one();
        drop(shared);

        log_debug!(self.logger, "dispatched request {} (type {})", request.id(), kind);
        Ok(request)
    }

    /// Whether work on an id is still wanted; see
    /// [`ComputeEngineInterface::should_continue`].
    pub fn should_continue(&self, id: RequestId) -> bool {
        let shared = self.shared.lock().unwrap();
        !shared.stopped && shared.ledger.iter().any(|slot| slot.id == id)
    }

    /// Hand back a computed result; see
    /// [`ComputeEngineInterface::provide_result`].
    pub fn provide_result(&self, result: ComputationResult) {
        let mut shared = self.shared.lock().unwrap();
        let accepted = match shared.ledger.iter_mut().find(|slot| slot.id == result.id()) {
            Some(slot) => {
                slot.value = Some(result.value());
                self.result_ready.notify_one();
                true
            }
            None => false,
        };
        drop(shared);

        if !accepted {
            // The submission was aborted while the engine was computing.
            log_debug!(self.logger, "dropped result for aborted request {}", result.id());
        }
    }

    /// Stop the buffer, releasing every waiting thread.
    ///
    /// All threads currently blocked in `request_computation`, `fetch_work`,
    /// or `next_result` fail with [`Stopped`], as does every later call to
    /// them. Non-blocking operations keep working against surviving state.
    /// Idempotent.
    pub fn stop(&self) {
        let mut shared = self.shared.lock().unwrap();
        if shared.stopped {
            return;
        }
        shared.stopped = true;

        // One signal per condition; released waiters chain-wake the rest.
        self.result_ready.notify_one();
        for index in 0..ComputationType::COUNT {
            self.work_available[index].notify_one();
            self.space_available[index].notify_one();
        }
        drop(shared);

        log_info!(self.logger, "stopping: releasing all waiting threads");
    }

    /// Whether no submission is queued, in flight, or awaiting delivery.
    pub fn is_idle(&self) -> bool {
        let shared = self.shared.lock().unwrap();
        shared.ledger.is_empty() && shared.pending.iter().all(|queue| queue.is_empty())
    }
}

impl Default for ComputationManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_QUEUE_SIZE)
    }
}

impl ClientInterface for ComputationManager {
    fn request_computation(&self, computation: Computation) -> Result<RequestId, Stopped> {
        ComputationManager::request_computation(self, computation)
    }

    fn abort_computation(&self, id: RequestId) {
        ComputationManager::abort_computation(self, id);
    }

    fn next_result(&self) -> Result<ComputationResult, Stopped> {
        ComputationManager::next_result(self)
    }
}

impl ComputeEngineInterface for ComputationManager {
    fn fetch_work(&self, kind: ComputationType) -> Result<Request, Stopped> {
        ComputationManager::fetch_work(self, kind)
    }

    fn should_continue(&self, id: RequestId) -> bool {
        ComputationManager::should_continue(self, id)
    }

    fn provide_result(&self, result: ComputationResult) {
        ComputationManager::provide_result(self, result);
    }
}
