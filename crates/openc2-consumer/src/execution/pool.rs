//! Fixed-size worker pool with a bounded job queue.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use thiserror::Error;
use tracing::{debug, warn};

use super::EXECUTION_TARGET;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Errors raised by the worker pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// A worker thread could not be started.
    #[error("failed to spawn worker thread {index}: {source}")]
    Spawn {
        /// Worker index.
        index: usize,
        /// Operating system error.
        #[source]
        source: io::Error,
    },
    /// The queue is at capacity.
    #[error("worker queue is full ({capacity} jobs pending)")]
    Full {
        /// Queue capacity.
        capacity: usize,
    },
    /// The pool no longer accepts jobs.
    #[error("worker pool has shut down")]
    Closed,
}

/// Runs submitted jobs on a fixed set of named threads.
///
/// Dropping the pool closes the queue, lets the workers drain the jobs
/// already queued and joins them.
#[derive(Debug)]
pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<thread::JoinHandle<()>>,
    capacity: usize,
}

impl WorkerPool {
    /// Starts `threads` workers sharing a queue of `capacity` jobs.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Spawn`] if a worker thread cannot be started.
    pub fn new(threads: usize, capacity: usize) -> Result<Self, PoolError> {
        let (sender, receiver) = bounded::<Job>(capacity);
        let mut pool = Self {
            sender: Some(sender),
            workers: Vec::with_capacity(threads),
            capacity,
        };
        for index in 0..threads {
            let receiver = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("openc2-worker-{index}"))
                .spawn(move || run_worker(&receiver))
                .map_err(|source| PoolError::Spawn { index, source })?;
            pool.workers.push(handle);
        }
        debug!(target: EXECUTION_TARGET, threads, capacity, "worker pool started");
        Ok(pool)
    }

    /// Queues a job without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Full`] when the queue is at capacity and
    /// [`PoolError::Closed`] when the workers are gone.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) -> Result<(), PoolError> {
        let sender = self.sender.as_ref().ok_or(PoolError::Closed)?;
        sender.try_send(Box::new(job)).map_err(|error| match error {
            TrySendError::Full(_) => PoolError::Full {
                capacity: self.capacity,
            },
            TrySendError::Disconnected(_) => PoolError::Closed,
        })
    }

    /// Number of jobs waiting for a worker.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.sender.as_ref().map_or(0, Sender::len)
    }

    /// Maximum number of queued jobs.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of worker threads.
    #[must_use]
    pub fn threads(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        drop(self.sender.take());
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!(target: EXECUTION_TARGET, "worker thread panicked");
            }
        }
    }
}

fn run_worker(receiver: &Receiver<Job>) {
    for job in receiver {
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            warn!(target: EXECUTION_TARGET, "background job panicked");
        }
    }
}
