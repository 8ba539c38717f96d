//! Error type for the computation buffer.

use thiserror::Error;

/// Failure raised by the blocking buffer operations once the buffer has
/// been stopped.
///
/// Only [`request_computation`](crate::manager::ClientInterface::request_computation),
/// [`next_result`](crate::manager::ClientInterface::next_result), and
/// [`fetch_work`](crate::manager::ComputeEngineInterface::fetch_work) produce
/// it, and only when [`stop`](crate::manager::ComputationManager::stop) was
/// called before or during their wait. Treat it as terminal: no later call
/// on the same buffer is meaningful.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("computation buffer is stopped")]
pub struct Stopped;
