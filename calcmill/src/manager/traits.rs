//! Role facades over the computation buffer.
//!
//! The buffer serves two disjoint thread populations. Each population sees
//! only its own facade, so a driver can depend on `Arc<dyn ClientInterface>`
//! or `Arc<dyn ComputeEngineInterface>` without reaching the other side's
//! operations (or `stop`, which stays on the concrete manager).

use super::error::Stopped;
use crate::computation::{Computation, ComputationResult, ComputationType, Request, RequestId};

/// Operations exposed to client threads: submit work, cancel it, and
/// collect results in submission order.
pub trait ClientInterface: Send + Sync {
    /// Submit a computation and obtain the id that identifies it from now on.
    ///
    /// Blocks while the pending queue for the computation's type is at
    /// capacity. Ids are assigned in the order submissions enter the
    /// buffer, so id order equals submission order.
    ///
    /// # Errors
    ///
    /// [`Stopped`] when the buffer was stopped before or during the wait.
    fn request_computation(&self, computation: Computation) -> Result<RequestId, Stopped>;

    /// Cancel the submission with the given id, whether still queued or
    /// already handed to an engine.
    ///
    /// An engine already computing it is expected to notice through
    /// [`should_continue`](ComputeEngineInterface::should_continue) and
    /// abandon the work. Unknown ids (already delivered, already aborted)
    /// are ignored. Never blocks.
    fn abort_computation(&self, id: RequestId);

    /// Take the next deliverable result, in submission order.
    ///
    /// Blocks while the oldest surviving submission has no result yet.
    /// Aborted submissions are skipped as if never made.
    ///
    /// # Errors
    ///
    /// [`Stopped`] when the buffer was stopped before or during the wait.
    fn next_result(&self) -> Result<ComputationResult, Stopped>;
}

/// Operations exposed to compute engines: pull work of one type, check for
/// cancellation while computing, and hand back results.
pub trait ComputeEngineInterface: Send + Sync {
    /// Take the oldest pending request of the given type.
    ///
    /// Blocks while no request of that type is pending.
    ///
    /// # Errors
    ///
    /// [`Stopped`] when the buffer was stopped before or during the wait.
    fn fetch_work(&self, kind: ComputationType) -> Result<Request, Stopped>;

    /// Whether work on the given id is still wanted.
    ///
    /// Answers `false` once the buffer is stopped or the submission was
    /// aborted; engines poll this between computation steps and abandon
    /// the work on `false`. Never blocks.
    fn should_continue(&self, id: RequestId) -> bool;

    /// Hand back a computed result.
    ///
    /// Results for aborted submissions are silently dropped. Never blocks.
    fn provide_result(&self, result: ComputationResult);
}
