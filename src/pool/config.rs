use serde::{Deserialize, Serialize};

/// Sizing for a worker pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of executors to start (0 = derive from CPU cores)
    pub workers: usize,
    /// Upper bound on results buffered before the driver drains them
    pub result_capacity: usize,
    /// Percentage of CPU cores to use when `workers` is 0 (1-100)
    pub thread_percentage: u8,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 64,
            result_capacity: 10_000,
            thread_percentage: 75,
        }
    }
}

impl PoolConfig {
    pub fn new(workers: usize, result_capacity: usize) -> Self {
        Self {
            workers,
            result_capacity,
            ..Default::default()
        }
    }

    /// Executor count to start with this configuration.
    ///
    /// An explicit worker count wins; otherwise it is derived from the
    /// available cores, see [`calculate_optimal_workers`].
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            calculate_optimal_workers(0, self.thread_percentage)
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.result_capacity == 0 {
            anyhow::bail!("pool.result_capacity cannot be 0");
        }
        if self.thread_percentage == 0 || self.thread_percentage > 100 {
            anyhow::bail!(
                "pool.thread_percentage must be between 1 and 100, got {}",
                self.thread_percentage
            );
        }
        Ok(())
    }
}

/// Calculate a worker count from available cores and configured limits.
///
/// ```text
/// 1. Detect available CPU cores: num_cpus::get()
/// 2. Apply percentage: cores * thread_percentage / 100
/// 3. Apply limit: min(max_threads, result) if max_threads > 0
/// 4. Ensure minimum: max(1, result)
/// ```
///
/// # Examples
/// ```rust
/// use scanpool::pool::calculate_optimal_workers;
///
/// let workers = calculate_optimal_workers(0, 75);
/// assert!(workers >= 1);
///
/// let workers = calculate_optimal_workers(8, 75);
/// assert!(workers <= 8);
/// ```
pub fn calculate_optimal_workers(max_threads: usize, thread_percentage: u8) -> usize {
    let available_cores = num_cpus::get();

    let workers_by_percentage =
        std::cmp::max(1, (available_cores * thread_percentage as usize) / 100);

    if max_threads > 0 {
        std::cmp::min(max_threads, workers_by_percentage)
    } else {
        workers_by_percentage
    }
}
