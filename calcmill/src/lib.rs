//! CalcMill - deferred computation brokering between clients and engines.
//!
//! This library provides a shared coordination buffer, the
//! [`ComputationManager`](manager::ComputationManager), that mediates typed
//! computations between two disjoint populations of threads: clients that
//! submit work and later collect results, and compute engines that pull
//! work, execute it, and return results. Queueing is bounded per
//! computation type, results come back in submission order, cancellation is
//! cooperative, and shutdown releases every waiting thread.
//!
//! # High-Level API
//!
//! ```
//! use calcmill::computation::{Computation, ComputationType};
//! use calcmill::engine::{default_calculator, EngineConfig, EnginePool};
//! use calcmill::manager::ComputationManager;
//! use std::sync::Arc;
//!
//! let manager = Arc::new(ComputationManager::default());
//!
//! // One pool of engine workers per computation type.
//! let pools: Vec<EnginePool> = ComputationType::ALL
//!     .into_iter()
//!     .map(|kind| {
//!         EnginePool::spawn(
//!             manager.clone(),
//!             kind,
//!             default_calculator(kind),
//!             EngineConfig::default(),
//!         )
//!     })
//!     .collect();
//!
//! let id = manager
//!     .request_computation(Computation::new(ComputationType::A, vec![1.0, 2.0]))
//!     .unwrap();
//! let result = manager.next_result().unwrap();
//! assert_eq!(result.id(), id);
//!
//! manager.stop();
//! for pool in pools {
//!     pool.join();
//! }
//! ```

pub mod computation;
pub mod engine;
pub mod log;
pub mod logging;
pub mod manager;

/// Version of the CalcMill library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
