//! Logging abstraction layer.
//!
//! Components that want diagnostics ([`ComputationManager`], [`EnginePool`],
//! the CLI runner) accept an `Arc<dyn Logger>` instead of calling a logging
//! backend directly:
//!
//! - [`Logger`] trait: the interface components log through
//! - [`TracingLogger`]: production adapter delegating to the `tracing` crate
//! - [`NoOpLogger`]: silent logger for tests and benchmarks
//!
//! Keeping the backend behind a trait lets the monitor code stay free of
//! any logging dependency, and keeps test output quiet without feature
//! flags.
//!
//! [`ComputationManager`]: crate::manager::ComputationManager
//! [`EnginePool`]: crate::engine::EnginePool

mod noop;
mod tracing_adapter;
mod r#trait;

pub use noop::NoOpLogger;
pub use r#trait::{LogLevel, Logger};
pub use tracing_adapter::TracingLogger;
