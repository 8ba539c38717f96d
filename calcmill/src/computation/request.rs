//! Computation submissions and their queued form.

use super::ComputationType;
use std::fmt;
use std::sync::Arc;

/// Identifier assigned to a submission by the buffer.
///
/// Ids are unique and strictly increasing over the lifetime of a manager;
/// assignment is serialized by the monitor, so id order equals submission
/// order. An id identifies a submission through its whole lifecycle:
/// queued, dispatched, and delivered (or aborted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the numeric value of this id.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unit of work submitted by a client.
///
/// Pairs a [`ComputationType`] with an immutable payload of doubles. The
/// payload is reference-counted: submitting a computation, queueing it, and
/// handing it to an engine all share the same underlying buffer.
///
/// # Example
///
/// ```
/// use calcmill::computation::{Computation, ComputationType};
///
/// let computation = Computation::new(ComputationType::A, vec![1.0, 2.0, 3.0]);
/// assert_eq!(computation.kind(), ComputationType::A);
/// assert_eq!(computation.data().len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Computation {
    kind: ComputationType,
    data: Arc<[f64]>,
}

impl Computation {
    /// Create a computation of the given type over the given payload.
    pub fn new(kind: ComputationType, data: impl Into<Arc<[f64]>>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }

    /// The computation type, used to route the work to a matching engine.
    pub fn kind(&self) -> ComputationType {
        self.kind
    }

    /// The read-only payload.
    pub fn data(&self) -> &Arc<[f64]> {
        &self.data
    }
}

/// A queued computation: the submission plus its assigned id.
///
/// This is what engines receive from
/// [`fetch_work`](crate::manager::ComputeEngineInterface::fetch_work).
/// Cloning a request is cheap; the payload stays shared.
#[derive(Debug, Clone)]
pub struct Request {
    id: RequestId,
    computation: Computation,
}

impl Request {
    pub(crate) fn new(id: RequestId, computation: Computation) -> Self {
        Self { id, computation }
    }

    /// The id the buffer assigned to this submission.
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// The computation type.
    pub fn kind(&self) -> ComputationType {
        self.computation.kind()
    }

    /// The read-only payload.
    pub fn data(&self) -> &Arc<[f64]> {
        self.computation.data()
    }
}
