//! Deterministic workload generation for the simulation.

use calcmill::computation::{Computation, ComputationType};

/// XorShift random number generator for workload decisions.
///
/// Deterministic per seed, so a simulation run can be reproduced exactly
/// by passing the same `--seed`.
pub struct XorShift {
    state: u64,
}

impl XorShift {
    pub fn new(seed: u64) -> Self {
        // The all-zero state is a fixed point of the shift sequence.
        Self {
            state: seed.max(1),
        }
    }

    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform value in `[0, max)`.
    pub fn next_usize(&mut self, max: usize) -> usize {
        (self.next() as usize) % max
    }

    /// True with roughly `percent` in 100 probability.
    pub fn chance(&mut self, percent: u8) -> bool {
        self.next_usize(100) < percent as usize
    }
}

/// Produces the stream of computations one simulated client submits.
pub struct WorkloadGenerator {
    rng: XorShift,
    payload_len: usize,
}

impl WorkloadGenerator {
    pub fn new(seed: u64, payload_len: usize) -> Self {
        Self {
            rng: XorShift::new(seed),
            payload_len,
        }
    }

    /// Next computation: random type, pseudo-random payload.
    pub fn next_computation(&mut self) -> Computation {
        let kind = ComputationType::ALL[self.rng.next_usize(ComputationType::COUNT)];
        let data: Vec<f64> = (0..self.payload_len)
            .map(|_| self.rng.next_usize(1000) as f64 / 10.0)
            .collect();
        Computation::new(kind, data)
    }

    /// Whether to abort one of the client's live submissions.
    pub fn should_abort(&mut self, percent: u8) -> bool {
        self.rng.chance(percent)
    }

    /// Index of the live submission to abort.
    pub fn pick(&mut self, live: usize) -> usize {
        self.rng.next_usize(live)
    }
}
