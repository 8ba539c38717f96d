//! Calculation kernels run by engine workers.

use crate::computation::ComputationType;
use std::sync::Arc;

/// An incremental fold over a computation payload.
///
/// Workers feed the payload through [`accumulate`](Calculator::accumulate)
/// one slice at a time instead of handing the kernel the whole buffer, so
/// cancellation can be polled between slices. [`finish`](Calculator::finish)
/// turns the accumulator into the final value once every slice is folded.
pub trait Calculator: Send + Sync {
    /// Fold one slice of the payload into the accumulator.
    fn accumulate(&self, acc: f64, slice: &[f64]) -> f64;

    /// Produce the final value from the accumulator and the payload length.
    fn finish(&self, acc: f64, len: usize) -> f64;
}

/// Sums the payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct SumCalculator;

impl Calculator for SumCalculator {
    fn accumulate(&self, acc: f64, slice: &[f64]) -> f64 {
        acc + slice.iter().sum::<f64>()
    }

    fn finish(&self, acc: f64, _len: usize) -> f64 {
        acc
    }
}

/// Arithmetic mean of the payload; empty payloads evaluate to zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanCalculator;

impl Calculator for MeanCalculator {
    fn accumulate(&self, acc: f64, slice: &[f64]) -> f64 {
        acc + slice.iter().sum::<f64>()
    }

    fn finish(&self, acc: f64, len: usize) -> f64 {
        if len == 0 {
            0.0
        } else {
            acc / len as f64
        }
    }
}

/// Root mean square of the payload; empty payloads evaluate to zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct RootMeanSquareCalculator;

impl Calculator for RootMeanSquareCalculator {
    fn accumulate(&self, acc: f64, slice: &[f64]) -> f64 {
        acc + slice.iter().map(|x| x * x).sum::<f64>()
    }

    fn finish(&self, acc: f64, len: usize) -> f64 {
        if len == 0 {
            0.0
        } else {
            (acc / len as f64).sqrt()
        }
    }
}

/// The calculator conventionally paired with each computation type.
pub fn default_calculator(kind: ComputationType) -> Arc<dyn Calculator> {
    match kind {
        ComputationType::A => Arc::new(SumCalculator),
        ComputationType::B => Arc::new(MeanCalculator),
        ComputationType::C => Arc::new(RootMeanSquareCalculator),
    }
}
