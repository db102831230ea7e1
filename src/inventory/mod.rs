//! Filesystem inventory built on the worker pool
//!
//! Every origin is a directory root and every resource kind is one listing
//! job for that root. Jobs fan out over the pool, and their results are
//! folded into per-origin counts once the pool is closed.

pub mod listing;
pub mod report;
pub mod types;

pub use listing::list_resources;
pub use report::{Inventory, OriginError};
pub use types::{ListInput, Resource, ResourceKind, ScanSettings};

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::sync::Arc;

use crate::pool::{PoolConfig, Work, WorkFn, WorkerPool};

/// Run one listing job per origin and resource kind, then aggregate.
///
/// Blocks until every job has reported. Failed jobs end up in
/// [`Inventory::errors`]; only pool-level failures are returned as `Err`.
pub fn run_inventory(
    origins: &[String],
    settings: &ScanSettings,
    pool_config: &PoolConfig,
) -> Result<Inventory> {
    let origins = unique_origins(origins);
    let mut inputs = Vec::with_capacity(settings.kinds.len());
    for kind in &settings.kinds {
        inputs.push(settings.list_input(*kind)?);
    }

    // Every job reports before draining starts, so the buffer must hold them all
    let jobs = origins.len() * inputs.len();
    let pool_config = PoolConfig {
        result_capacity: pool_config.result_capacity.max(jobs),
        ..pool_config.clone()
    };

    let mut pool = WorkerPool::with_config(&pool_config).context("Failed to start worker pool")?;
    tracing::info!(
        origins = origins.len(),
        jobs,
        workers = pool.workers(),
        capacity = pool.capacity(),
        "starting inventory scan"
    );

    let list: WorkFn<ListInput, Resource> = Arc::new(list_resources);
    for origin in &origins {
        for input in &inputs {
            pool.add_work(Work::from_shared(list.clone(), origin.as_str(), input.clone()))
                .with_context(|| format!("Failed to queue {} for {}", input.kind, origin))?;
        }
    }

    let results = pool.close_workers().wait().close_results();
    Ok(Inventory::from_results(results))
}

/// Drop repeated origins, keeping first-seen order
pub fn unique_origins(origins: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(origins.len());
    origins
        .iter()
        .filter(|origin| seen.insert(origin.as_str()))
        .cloned()
        .collect()
}
