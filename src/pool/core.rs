use crossbeam::channel::{Receiver, Sender, bounded};
use crossbeam::sync::WaitGroup;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use super::config::PoolConfig;
use super::error::PoolError;
use super::result::ScanResult;
use super::work::Work;

/// Lifecycle state of a pool, for logging and assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// Workers being added, work being queued
    Building,
    /// Queue closed, executors finishing queued and in-flight items
    Draining,
    /// Every executor has exited, results still open
    Waiting,
    /// Results closed, safe to drain and aggregate
    Closed,
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PoolState::Building => "building",
            PoolState::Draining => "draining",
            PoolState::Waiting => "waiting",
            PoolState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Fan-out/fan-in worker pool in its building state.
///
/// Work is handed over through a zero-capacity queue, so [`add_work`] blocks
/// until an executor is free to take the item. Results go to a buffered
/// channel sized at construction; executors block on it only when it is full.
///
/// Each lifecycle step consumes the pool and returns the next state, so work
/// cannot be queued after [`close_workers`] and results cannot be closed
/// before [`DrainingPool::wait`] has returned.
///
/// [`add_work`]: WorkerPool::add_work
/// [`close_workers`]: WorkerPool::close_workers
pub struct WorkerPool<I, R> {
    queue_tx: Sender<Work<I, R>>,
    queue_rx: Receiver<Work<I, R>>,
    results_tx: Sender<ScanResult<R>>,
    results_rx: Receiver<ScanResult<R>>,
    active: WaitGroup,
    workers: usize,
    capacity: usize,
}

/// Everything an executor thread needs, moved into the thread on spawn
struct ExecutorContext<I, R> {
    worker_id: usize,
    queue_rx: Receiver<Work<I, R>>,
    results_tx: Sender<ScanResult<R>>,
    active: WaitGroup,
}

impl<I, R> WorkerPool<I, R>
where
    I: Send + 'static,
    R: Send + 'static,
{
    /// Create an empty pool whose result buffer holds `result_capacity` results.
    ///
    /// Size the buffer to the number of results expected before draining
    /// starts; a full buffer stalls executors until the driver reads it.
    pub fn new(result_capacity: usize) -> Result<Self, PoolError> {
        if result_capacity == 0 {
            return Err(PoolError::ZeroCapacity);
        }

        let (queue_tx, queue_rx) = bounded(0);
        let (results_tx, results_rx) = bounded(result_capacity);

        Ok(Self {
            queue_tx,
            queue_rx,
            results_tx,
            results_rx,
            active: WaitGroup::new(),
            workers: 0,
            capacity: result_capacity,
        })
    }

    /// Create a pool and start the executors described by `config`
    pub fn with_config(config: &PoolConfig) -> Result<Self, PoolError> {
        let mut pool = Self::new(config.result_capacity)?;
        pool.add_workers(config.effective_workers())?;
        Ok(pool)
    }

    /// Start one executor and register it with the completion barrier
    pub fn add_worker(&mut self) -> Result<(), PoolError> {
        let worker_id = self.workers;
        let ctx = ExecutorContext {
            worker_id,
            queue_rx: self.queue_rx.clone(),
            results_tx: self.results_tx.clone(),
            active: self.active.clone(),
        };

        thread::Builder::new()
            .name(format!("pool-worker-{worker_id}"))
            .spawn(move || run_executor(ctx))
            .map_err(|source| PoolError::Spawn { worker_id, source })?;

        self.workers += 1;
        Ok(())
    }

    /// Start `count` executors
    pub fn add_workers(&mut self, count: usize) -> Result<(), PoolError> {
        for _ in 0..count {
            self.add_worker()?;
        }
        tracing::debug!(workers = self.workers, "worker pool started executors");
        Ok(())
    }

    /// Submit one work item, blocking until an executor receives it
    pub fn add_work(&self, work: Work<I, R>) -> Result<(), PoolError> {
        if self.workers == 0 {
            return Err(PoolError::NoWorkers {
                origin: work.origin().to_owned(),
            });
        }

        tracing::trace!(origin = work.origin(), "dispatching work");
        // Cannot fail: the pool keeps its own queue receiver until close_workers
        if self.queue_tx.send(work).is_err() {
            unreachable!("work queue receiver dropped while the pool is building");
        }
        Ok(())
    }

    /// Push a result directly into the result buffer, blocking while it is full
    pub fn add_result(&self, result: ScanResult<R>) {
        push_result(&self.results_tx, result);
    }

    /// Number of executors started so far
    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn state(&self) -> PoolState {
        PoolState::Building
    }

    /// Close the work queue; executors drain what is left and then exit
    pub fn close_workers(self) -> DrainingPool<R> {
        let Self {
            queue_tx,
            queue_rx,
            results_tx,
            results_rx,
            active,
            workers,
            ..
        } = self;

        drop(queue_tx);
        drop(queue_rx);
        tracing::debug!(workers, state = %PoolState::Draining, "work queue closed");

        DrainingPool {
            results_tx,
            results_rx,
            active,
            workers,
        }
    }
}

/// Pool whose work queue is closed while executors finish
pub struct DrainingPool<R> {
    results_tx: Sender<ScanResult<R>>,
    results_rx: Receiver<ScanResult<R>>,
    active: WaitGroup,
    workers: usize,
}

impl<R> DrainingPool<R> {
    pub fn add_result(&self, result: ScanResult<R>) {
        push_result(&self.results_tx, result);
    }

    pub fn state(&self) -> PoolState {
        PoolState::Draining
    }

    /// Block until every executor has exited its loop
    pub fn wait(self) -> WaitingPool<R> {
        let Self {
            results_tx,
            results_rx,
            active,
            workers,
        } = self;

        active.wait();
        tracing::debug!(
            workers,
            buffered = results_rx.len(),
            state = %PoolState::Waiting,
            "all executors finished"
        );

        WaitingPool {
            results_tx,
            results_rx,
        }
    }
}

/// Pool with no live executors whose results are still open
pub struct WaitingPool<R> {
    results_tx: Sender<ScanResult<R>>,
    results_rx: Receiver<ScanResult<R>>,
}

impl<R> WaitingPool<R> {
    /// Push a result without blocking.
    ///
    /// No executor is left and the results are not readable until
    /// [`close_results`](Self::close_results), so a full buffer is an error
    /// here instead of a wait.
    pub fn add_result(&self, result: ScanResult<R>) -> Result<(), PoolError> {
        self.results_tx.try_send(result).map_err(|e| PoolError::ResultsFull {
            origin: e.into_inner().origin().to_owned(),
        })
    }

    pub fn state(&self) -> PoolState {
        PoolState::Waiting
    }

    /// Close the result channel and hand back the buffered results
    pub fn close_results(self) -> Results<R> {
        drop(self.results_tx);
        tracing::debug!(
            buffered = self.results_rx.len(),
            state = %PoolState::Closed,
            "results closed"
        );
        Results {
            results_rx: self.results_rx,
        }
    }
}

/// Closed pool: a single-pass sequence of results in arrival order
pub struct Results<R> {
    results_rx: Receiver<ScanResult<R>>,
}

impl<R> Results<R> {
    pub fn state(&self) -> PoolState {
        PoolState::Closed
    }

    /// Results not yet consumed
    pub fn remaining(&self) -> usize {
        self.results_rx.len()
    }

    /// Drain every remaining result into a vector
    pub fn get_results(self) -> Vec<ScanResult<R>> {
        self.collect()
    }
}

impl<R> Iterator for Results<R> {
    type Item = ScanResult<R>;

    fn next(&mut self) -> Option<Self::Item> {
        self.results_rx.recv().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.results_rx.len();
        (remaining, Some(remaining))
    }
}

fn push_result<R>(results_tx: &Sender<ScanResult<R>>, result: ScanResult<R>) {
    if let Err(e) = results_tx.send(result) {
        let dropped = e.into_inner();
        tracing::warn!(origin = dropped.origin(), "result dropped: receiver closed");
    }
}

/// Executor loop: pull work until the queue is closed and empty.
///
/// A panicking work function is turned into an error result for its origin,
/// so the executor keeps serving the queue and the item is still reported.
fn run_executor<I, R>(ctx: ExecutorContext<I, R>) {
    let ExecutorContext {
        worker_id,
        queue_rx,
        results_tx,
        active,
    } = ctx;

    tracing::debug!(worker_id, "executor started");
    let mut processed = 0usize;

    while let Ok(work) = queue_rx.recv() {
        let origin = work.origin().to_owned();
        let result = match panic::catch_unwind(AssertUnwindSafe(|| work.run())) {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(worker_id, origin = %origin, "work function panicked: {}", message);
                ScanResult::error(origin, format!("work function panicked: {message}"))
            }
        };
        processed += 1;

        if results_tx.send(result).is_err() {
            break; // Receiver dropped
        }
    }

    tracing::debug!(worker_id, processed, "executor exiting");

    // Release the result sender before signalling the barrier so closing
    // results after `wait` leaves no live producers.
    drop(results_tx);
    drop(active);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn echo(origin: &str, value: u32) -> ScanResult<u32> {
        ScanResult::with_resources(origin, vec![value])
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let pool = WorkerPool::<u32, u32>::new(0);
        assert!(matches!(pool, Err(PoolError::ZeroCapacity)));
    }

    #[test]
    fn test_lifecycle_states() {
        let mut pool = WorkerPool::<u32, u32>::new(4).unwrap();
        assert_eq!(pool.state(), PoolState::Building);
        pool.add_worker().unwrap();
        assert_eq!(pool.workers(), 1);
        assert_eq!(pool.capacity(), 4);

        let draining = pool.close_workers();
        assert_eq!(draining.state(), PoolState::Draining);
        let waiting = draining.wait();
        assert_eq!(waiting.state(), PoolState::Waiting);
        let results = waiting.close_results();
        assert_eq!(results.state(), PoolState::Closed);
        assert_eq!(results.count(), 0);
    }

    #[test]
    fn test_no_workers_rejects_work() {
        let pool = WorkerPool::<u32, u32>::new(1).unwrap();
        let err = pool.add_work(Work::new(echo, "us-east-1", 1)).unwrap_err();
        assert!(matches!(err, PoolError::NoWorkers { ref origin } if origin == "us-east-1"));
    }

    #[test]
    fn test_results_round_trip_through_pool() {
        let mut pool = WorkerPool::new(8).unwrap();
        pool.add_workers(2).unwrap();

        for (i, origin) in ["a", "b", "c"].iter().enumerate() {
            pool.add_work(Work::new(echo, *origin, i as u32)).unwrap();
        }

        let mut results: Vec<_> = pool.close_workers().wait().close_results().collect();
        results.sort_by(|x, y| x.origin().cmp(y.origin()));

        let origins: Vec<_> = results.iter().map(|r| r.origin()).collect();
        assert_eq!(origins, vec!["a", "b", "c"]);
        assert_eq!(results[2].resources(), &[2]);
    }

    #[test]
    fn test_panicking_work_becomes_error_result() {
        let mut pool = WorkerPool::new(4).unwrap();
        pool.add_worker().unwrap();

        pool.add_work(Work::new(
            |_: &str, _: u32| -> ScanResult<u32> { panic!("describe call exploded") },
            "broken",
            0,
        ))
        .unwrap();
        // The same executor must still be alive to take this one
        pool.add_work(Work::new(echo, "healthy", 5)).unwrap();

        let results = pool.close_workers().wait().close_results().get_results();
        assert_eq!(results.len(), 2);

        let broken = &results[0];
        assert!(broken.is_error());
        assert_eq!(broken.origin(), "broken");
        assert!(broken.error_message().unwrap().contains("describe call exploded"));

        assert_eq!(results[1].resources(), &[5]);
    }

    #[test]
    fn test_add_result_in_every_open_state() {
        let mut pool = WorkerPool::<u32, u32>::new(3).unwrap();
        pool.add_worker().unwrap();
        pool.add_result(ScanResult::new("building"));

        let draining = pool.close_workers();
        draining.add_result(ScanResult::new("draining"));

        let waiting = draining.wait();
        waiting
            .add_result(ScanResult::error("waiting", "late failure"))
            .unwrap();

        let results = waiting.close_results();
        assert_eq!(results.remaining(), 3);
        let origins: Vec<_> = results.map(|r| r.origin().to_owned()).collect();
        assert_eq!(origins, vec!["building", "draining", "waiting"]);
    }

    #[test]
    fn test_add_result_after_wait_rejects_full_buffer() {
        let mut pool = WorkerPool::new(1).unwrap();
        pool.add_worker().unwrap();
        pool.add_work(Work::new(echo, "worker", 1)).unwrap();

        let waiting = pool.close_workers().wait();
        let err = waiting
            .add_result(ScanResult::error("driver", "late"))
            .unwrap_err();
        assert!(matches!(err, PoolError::ResultsFull { ref origin } if origin == "driver"));

        let results = waiting.close_results().get_results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].origin(), "worker");
    }

    #[test]
    fn test_pool_state_names() {
        assert_eq!(PoolState::Building.to_string(), "building");
        assert_eq!(PoolState::Closed.to_string(), "closed");
    }

    #[test]
    fn test_each_item_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut pool = WorkerPool::new(64).unwrap();
        pool.add_workers(4).unwrap();

        for i in 0..50u32 {
            let calls = calls.clone();
            pool.add_work(Work::new(
                move |origin: &str, value: u32| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    ScanResult::with_resources(origin, vec![value])
                },
                format!("origin-{i}"),
                i,
            ))
            .unwrap();
        }

        let results = pool.close_workers().wait().close_results().get_results();
        assert_eq!(calls.load(Ordering::SeqCst), 50);
        assert_eq!(results.len(), 50);
    }

    #[test]
    fn test_with_config_starts_workers() {
        let pool = WorkerPool::<u32, u32>::with_config(&PoolConfig::new(3, 10)).unwrap();
        assert_eq!(pool.workers(), 3);
        assert_eq!(pool.close_workers().wait().close_results().count(), 0);
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u8), "Unknown panic");
    }
}
