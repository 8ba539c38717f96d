//! No-operation logger implementation.

use crate::log::{LogLevel, Logger};
use std::fmt::Arguments;

/// A logger that discards all messages.
///
/// The default for [`ComputationManager`](crate::manager::ComputationManager)
/// and [`EnginePool`](crate::engine::EnginePool): unit tests stay quiet and
/// benchmarks pay nothing for logging.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    #[inline]
    fn log(&self, _level: LogLevel, _args: Arguments<'_>) {}
}
