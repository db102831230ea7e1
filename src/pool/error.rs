use thiserror::Error;

/// Errors raised by the worker pool itself.
///
/// Failures inside work functions never show up here; they travel as
/// [`ScanResult::Error`](super::ScanResult::Error) values.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The result buffer needs room for at least one result
    #[error("result capacity must be greater than 0")]
    ZeroCapacity,

    /// Work was submitted before any executor was added, so nothing could receive it
    #[error("cannot submit work for origin '{origin}': pool has no workers")]
    NoWorkers { origin: String },

    /// The OS refused to start an executor thread
    #[error("failed to spawn worker {worker_id}: {source}")]
    Spawn {
        worker_id: usize,
        #[source]
        source: std::io::Error,
    },

    /// The result buffer is full after every executor has exited, so a
    /// blocking push could never complete
    #[error("result buffer full, dropped result for origin '{origin}'")]
    ResultsFull { origin: String },
}
