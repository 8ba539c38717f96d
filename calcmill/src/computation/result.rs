//! Computed results.

use super::RequestId;
use std::cmp::Ordering;

/// The value an engine computed for a submission.
///
/// Results compare by id, which equals submission order, so a sorted run of
/// results is in delivery order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputationResult {
    id: RequestId,
    value: f64,
}

impl ComputationResult {
    /// Create a result for the submission with the given id.
    pub fn new(id: RequestId, value: f64) -> Self {
        Self { id, value }
    }

    /// The id of the submission this result answers.
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// The computed value.
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl PartialOrd for ComputationResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.id.cmp(&other.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let result = ComputationResult::new(RequestId::new(3), 2.75);
        assert_eq!(result.id(), RequestId::new(3));
        assert_eq!(result.value(), 2.75);
    }

    #[test]
    fn test_orders_by_id_not_value() {
        let first = ComputationResult::new(RequestId::new(1), 100.0);
        let second = ComputationResult::new(RequestId::new(2), -5.0);
        assert!(first < second);
    }
}
