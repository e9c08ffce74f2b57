//! Bounded worker pool for provider calls.
//!
//! One pool is shared by every gateway that should count against the same
//! concurrency ceiling. Each call holds a semaphore permit while it talks to
//! the provider and runs on a blocking-pool thread, so a provider that
//! blocks its thread cannot stall the caller's deadline. A cancellation
//! token fires when the caller's deadline passes or the caller goes away.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Why a pooled call produced no value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The deadline passed before the worker finished (or got a permit).
    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// The worker task panicked or was aborted.
    #[error("worker task failed: {0}")]
    WorkerFailed(String),

    /// The pool's semaphore was closed.
    #[error("worker pool is closed")]
    Closed,
}

/// Shared, bounded pool of provider-call workers. Cheap to clone.
#[derive(Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    max_workers: usize,
}

impl WorkerPool {
    /// Create a pool allowing at most `max_workers` calls in flight.
    /// `max_workers` is clamped to a minimum of 1.
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max_workers)),
            max_workers,
        }
    }

    /// Configured concurrency ceiling.
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Run `task` on a pooled worker, waiting at most `deadline`.
    ///
    /// Time spent waiting for a free slot counts against the deadline. On
    /// timeout the worker's token is cancelled and the task is dropped at
    /// its next await point. A worker stuck in blocking code is abandoned:
    /// it keeps its slot until it returns, and its output is discarded.
    pub async fn run<F, T>(&self, deadline: Duration, task: F) -> Result<T, PoolError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let started = Instant::now();
        let token = CancellationToken::new();
        // Cancels the worker on every exit path, including caller drop.
        let _cancel_on_exit = token.clone().drop_guard();

        let worker_token = token.clone();
        let permits = self.permits.clone();
        let runtime = Handle::current();

        let call = async move {
            let permit = permits
                .acquire_owned()
                .await
                .map_err(|_| PoolError::Closed)?;

            let worker = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                runtime.block_on(async move {
                    tokio::select! {
                        biased;
                        _ = worker_token.cancelled() => None,
                        out = task => Some(out),
                    }
                })
            });

            match worker.await {
                Ok(Some(out)) => Ok(out),
                Ok(None) => Err(PoolError::DeadlineExceeded(deadline)),
                Err(join_err) => Err(PoolError::WorkerFailed(join_err.to_string())),
            }
        };

        let outcome = tokio::select! {
            biased;
            _ = tokio::time::sleep(deadline) => Err(PoolError::DeadlineExceeded(deadline)),
            out = call => out,
        };

        match outcome {
            // A result that only showed up after the deadline is never observed.
            Ok(_) if started.elapsed() > deadline => Err(PoolError::DeadlineExceeded(deadline)),
            other => other,
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(16)
    }
}
