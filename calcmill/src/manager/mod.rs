//! The shared computation buffer between clients and compute engines.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Client threads                          │
//! │      request_computation / abort_computation / next_result  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   ComputationManager                        │
//! │  - One bounded FIFO of pending requests per type            │
//! │  - Result ledger in submission order (delivery order)       │
//! │  - Single mutex + per-type/result condition variables       │
//! └─────────────────────────────────────────────────────────────┘
//!                              ▲
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Compute-engine threads                     │
//! │        fetch_work / should_continue / provide_result        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The two thread populations never see each other's operations: clients
//! depend on [`ClientInterface`], engines on [`ComputeEngineInterface`].
//! [`ComputationManager::stop`] releases every blocked thread; from then on
//! the blocking operations fail with [`Stopped`].
//!
//! # Ordering guarantees
//!
//! - Ids are assigned in the order submissions enter the buffer.
//! - Results are delivered strictly in ascending id order of the surviving
//!   (non-aborted) submissions, regardless of the order engines finish in.
//! - Within one computation type, work is dispatched in submission order.
//!   No dispatch order is guaranteed across types.

mod core;
mod error;
mod traits;

pub use self::core::{ComputationManager, DEFAULT_MAX_QUEUE_SIZE};
pub use error::Stopped;
pub use traits::{ClientInterface, ComputeEngineInterface};
