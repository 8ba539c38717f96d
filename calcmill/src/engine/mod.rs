//! Compute-engine drivers.
//!
//! The buffer itself never runs a computation; these workers do. An
//! [`EnginePool`] owns a set of threads bound to one
//! [`ComputationType`](crate::computation::ComputationType), each looping
//! fetch → compute → provide against a shared
//! [`ComputationManager`](crate::manager::ComputationManager).
//!
//! Computations are expressed as [`Calculator`] folds so that workers can
//! poll for cancellation between payload slices; an aborted submission is
//! abandoned at the next poll instead of computed to completion.

mod calculator;
mod pool;

pub use calculator::{
    default_calculator, Calculator, MeanCalculator, RootMeanSquareCalculator, SumCalculator,
};
pub use pool::{EngineConfig, EnginePool};
