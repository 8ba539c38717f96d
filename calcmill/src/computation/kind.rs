//! Computation type tags.

use std::fmt;

/// The closed set of computation types the buffer routes work by.
///
/// Every pending-work queue, and every compute engine, is bound to exactly
/// one of these types. The set is a compile-time constant of the system;
/// per-type structures are sized with [`ComputationType::COUNT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComputationType {
    /// Summation workloads.
    A,
    /// Averaging workloads.
    B,
    /// Root-mean-square workloads.
    C,
}

impl ComputationType {
    /// Number of computation types.
    pub const COUNT: usize = 3;

    /// All computation types, in ordinal order.
    pub const ALL: [ComputationType; Self::COUNT] =
        [ComputationType::A, ComputationType::B, ComputationType::C];

    /// Dense ordinal of this type, used to address per-type arrays.
    pub fn index(self) -> usize {
        match self {
            ComputationType::A => 0,
            ComputationType::B => 1,
            ComputationType::C => 2,
        }
    }
}

impl fmt::Display for ComputationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputationType::A => write!(f, "A"),
            ComputationType::B => write!(f, "B"),
            ComputationType::C => write!(f, "C"),
        }
    }
}
