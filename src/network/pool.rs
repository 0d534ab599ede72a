//! Worker pools
//!
//! The pool contract that runs one session per accepted connection, with
//! two interchangeable disciplines behind it.
//!
//! A process-per-worker discipline is deliberately not offered: handing a
//! connection descriptor to another process would leave each worker with
//! its own statistics counters, and the statistics query only makes sense
//! against one shared set.

use std::thread;

use crossbeam::channel::{self, Receiver, Sender};

use crate::error::{DepotError, Result};

/// A unit of work scheduled onto a pool
type Job = Box<dyn FnOnce() + Send + 'static>;

/// Contract for scheduling session jobs on a bounded set of workers
pub trait ThreadPool {
    /// Create a pool with the given number of workers
    fn new(workers: u32) -> Result<Self>
    where
        Self: Sized;

    /// Schedule a job to run on a worker.
    ///
    /// Never blocks the caller waiting for the job to finish; jobs queue
    /// when every worker is busy.
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static;
}

// =============================================================================
// Shared-queue discipline
// =============================================================================

/// Fixed worker threads pulling jobs from one shared channel.
///
/// A worker that panics while running a job is replaced, so capacity does
/// not degrade over the life of the server.
pub struct SharedQueueThreadPool {
    tx: Sender<Job>,
}

impl ThreadPool for SharedQueueThreadPool {
    fn new(workers: u32) -> Result<Self> {
        let (tx, rx) = channel::unbounded::<Job>();
        for _ in 0..workers {
            let task_rx = TaskReceiver(rx.clone());
            thread::Builder::new().spawn(move || run_tasks(task_rx))?;
        }
        Ok(Self { tx })
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        // Send fails only once every worker is gone, which the respawning
        // receiver prevents short of thread creation failing at the OS level
        if self.tx.send(Box::new(job)).is_err() {
            tracing::error!("worker queue disconnected, job dropped");
        }
    }
}

/// Receiving side held by each worker; respawns the worker if a job panics
#[derive(Clone)]
struct TaskReceiver(Receiver<Job>);

impl Drop for TaskReceiver {
    fn drop(&mut self) {
        if thread::panicking() {
            tracing::debug!("worker panicked, starting a replacement");
            let task_rx = self.clone();
            if let Err(e) = thread::Builder::new().spawn(move || run_tasks(task_rx)) {
                tracing::error!("failed to spawn replacement worker: {}", e);
            }
        }
    }
}

/// Worker loop: run jobs until every sender is dropped
fn run_tasks(rx: TaskReceiver) {
    while let Ok(job) = rx.0.recv() {
        job();
    }
    tracing::debug!("worker exiting, pool destroyed");
}

// =============================================================================
// Rayon discipline
// =============================================================================

/// Work-stealing pool backed by rayon
pub struct RayonThreadPool {
    pool: rayon::ThreadPool,
}

impl ThreadPool for RayonThreadPool {
    fn new(workers: u32) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers as usize)
            .build()
            .map_err(|e| DepotError::Pool(format!("could not build rayon pool: {}", e)))?;
        Ok(Self { pool })
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        // spawn, not install: the acceptor must never wait for a session
        self.pool.spawn(job);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};
    use std::time::Duration;

    fn run_and_count<P: ThreadPool>(pool: &P, jobs: usize) -> usize {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel();

        for _ in 0..jobs {
            let counter = Arc::clone(&counter);
            let tx = tx.clone();
            pool.spawn(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                tx.send(()).unwrap();
            });
        }
        for _ in 0..jobs {
            rx.recv_timeout(Duration::from_secs(5)).unwrap();
        }

        counter.load(Ordering::SeqCst)
    }

    #[test]
    fn shared_queue_runs_all_jobs() {
        let pool = SharedQueueThreadPool::new(4).unwrap();
        assert_eq!(run_and_count(&pool, 64), 64);
    }

    #[test]
    fn rayon_runs_all_jobs() {
        let pool = RayonThreadPool::new(4).unwrap();
        assert_eq!(run_and_count(&pool, 64), 64);
    }

    #[test]
    fn shared_queue_replaces_panicked_worker() {
        let pool = SharedQueueThreadPool::new(1).unwrap();
        pool.spawn(|| panic!("job panic"));

        // The only worker just died; the replacement must pick this up
        let (tx, rx) = mpsc::channel();
        pool.spawn(move || {
            tx.send(()).unwrap();
        });
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
    }
}
