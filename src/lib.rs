//! # scanpool
//!
//! A fan-out/fan-in worker pool for running many independent scans and
//! gathering their results, plus a filesystem inventory built on top of it.
//!
//! - [`pool`]: the pool itself, its work items and the success-or-error
//!   result type every work function returns
//! - [`inventory`]: one listing job per origin and resource kind, with the
//!   counts aggregated per origin
//! - [`config`]: layered configuration (defaults, files, environment, flags)
//! - [`cli`]: the `scanpool` command line
//!
//! ```bash
//! # Count files and directories below two roots with 16 workers
//! scanpool scan ./src ./tests --workers 16
//!
//! # Machine-readable output, failing when any root cannot be listed
//! scanpool scan /srv/a /srv/b --format json --fail-on-error
//! ```

pub mod cli;
pub mod config;
pub mod inventory;
pub mod pool;

pub use cli::{Cli, Output};
pub use config::ScanpoolConfig;
pub use pool::{ScanResult, Work, WorkerPool};

/// Result type alias for scanpool operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
