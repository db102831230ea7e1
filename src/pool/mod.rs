//! Generic fan-out/fan-in worker pool
//!
//! Runs many independent, possibly slow, possibly failing units of work on a
//! fixed set of executor threads and collects their results for a single
//! consumer that drains them once everything has finished.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  add_work   ┌─────────────┐   recv    ┌────────────┐
//! │  Driver  │────────────▶│ work queue  │──────────▶│ executor 0 │──┐
//! │          │ (blocks     │ (capacity 0)│──────────▶│ executor 1 │──┤ ScanResult
//! │          │  until an   └─────────────┘──────────▶│ executor N │──┤
//! │          │  executor                              └────────────┘  │
//! │          │  is free)                                              ▼
//! │          │◀────────────── drain after close_results ───── result buffer
//! └──────────┘                                                (capacity C)
//! ```
//!
//! # Lifecycle
//!
//! Each step consumes the previous state, so the ordering rules are enforced
//! by the compiler:
//!
//! | State    | Type             | Next step                          |
//! |----------|------------------|------------------------------------|
//! | Building | [`WorkerPool`]   | [`WorkerPool::close_workers`]      |
//! | Draining | [`DrainingPool`] | [`DrainingPool::wait`]             |
//! | Waiting  | [`WaitingPool`]  | [`WaitingPool::close_results`]     |
//! | Closed   | [`Results`]      | iterate                            |
//!
//! The pool has no timeouts and no retries. A work function bounds its own
//! runtime and reports failures as [`ScanResult::Error`].
//!
//! # Example Usage
//!
//! ```rust
//! use scanpool::pool::{ScanResult, Work, WorkerPool};
//!
//! fn list_groups(region: &str, limit: usize) -> ScanResult<String> {
//!     let groups = (0..limit).map(|i| format!("{region}/sg-{i}")).collect();
//!     ScanResult::with_resources(region, groups)
//! }
//!
//! let mut pool = WorkerPool::new(16)?;
//! pool.add_workers(4)?;
//!
//! for region in ["us-east-1", "eu-west-1"] {
//!     pool.add_work(Work::new(list_groups, region, 2))?;
//! }
//!
//! let results = pool.close_workers().wait().close_results();
//! let total: usize = results.map(|r| r.resources().len()).sum();
//! assert_eq!(total, 4);
//! # Ok::<(), scanpool::pool::PoolError>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod result;
pub mod work;

pub use config::{PoolConfig, calculate_optimal_workers};
pub use self::core::{DrainingPool, PoolState, Results, WaitingPool, WorkerPool};
pub use error::PoolError;
pub use result::ScanResult;
pub use work::{Work, WorkFn};
