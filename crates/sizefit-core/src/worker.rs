//! Off-thread execution of compression runs.
//!
//! A `CompressionWorker` owns a small pool of threads fed through a
//! crossbeam job channel. Each submission gets its own one-slot completion
//! channel, so the caller receives exactly one `Completion` per run and can
//! keep serving input while encoding happens elsewhere.
//!
//! Runs are independent: nothing orders or deduplicates them. A caller that
//! resubmits (for example after switching budgets) should match completions
//! by `RunId` and drop the stale ones, or cancel the superseded handle.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use tracing::{debug, error};

use crate::budget::BudgetPreset;
use crate::encode::Encoder;
use crate::error::CompressError;
use crate::search::{CancellationToken, CompressionOutcome, Compressor};
use crate::source::SourceImage;

/// Identifies one submission. Increases monotonically per worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(u64);

impl RunId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// The single message a run delivers.
#[derive(Debug)]
pub struct Completion {
    pub run_id: RunId,
    pub outcome: CompressionOutcome,
}

struct Job {
    run_id: RunId,
    image: Arc<SourceImage>,
    budget: BudgetPreset,
    cancel: CancellationToken,
    reply: Sender<Completion>,
}

/// Caller's side of an in-flight run.
#[derive(Debug)]
pub struct RunHandle {
    id: RunId,
    cancel: CancellationToken,
    completion: Receiver<Completion>,
}

impl RunHandle {
    pub fn id(&self) -> RunId {
        self.id
    }

    /// Stop the run before its next attempt. The attempt in flight, if any,
    /// still completes.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Block until the run completes.
    pub fn wait(self) -> Completion {
        self.completion
            .recv()
            .unwrap_or_else(|_| self.unavailable())
    }

    /// Take the completion if it has already arrived, or get the handle back.
    ///
    /// A handle is consumed by the poll that delivers, so no run reports twice.
    pub fn try_wait(self) -> Result<Completion, RunHandle> {
        match self.completion.try_recv() {
            Ok(completion) => Ok(completion),
            Err(TryRecvError::Empty) => Err(self),
            Err(TryRecvError::Disconnected) => Ok(self.unavailable()),
        }
    }

    /// Block for at most `timeout`, handing the handle back if still pending.
    pub fn wait_timeout(self, timeout: Duration) -> Result<Completion, RunHandle> {
        match self.completion.recv_timeout(timeout) {
            Ok(completion) => Ok(completion),
            Err(RecvTimeoutError::Timeout) => Err(self),
            Err(RecvTimeoutError::Disconnected) => Ok(self.unavailable()),
        }
    }

    fn unavailable(&self) -> Completion {
        Completion {
            run_id: self.id,
            outcome: CompressionOutcome::Failed(CompressError::WorkerUnavailable),
        }
    }
}

/// Thread pool that runs compressions off the caller's thread.
pub struct CompressionWorker {
    jobs: Option<Sender<Job>>,
    queue: Receiver<Job>,
    threads: Vec<JoinHandle<()>>,
    next_id: AtomicU64,
}

impl CompressionWorker {
    /// Spawn `threads` workers (at least one) sharing `compressor`.
    pub fn spawn<E>(compressor: Compressor<E>, threads: usize) -> std::io::Result<Self>
    where
        E: Encoder + 'static,
    {
        let compressor = Arc::new(compressor);
        let (tx, rx) = unbounded::<Job>();

        let handles = (0..threads.max(1))
            .map(|n| {
                let rx = rx.clone();
                let compressor = Arc::clone(&compressor);
                thread::Builder::new()
                    .name(format!("sizefit-worker-{n}"))
                    .spawn(move || worker_loop(&compressor, &rx))
            })
            .collect::<std::io::Result<Vec<_>>>()?;

        Ok(Self {
            jobs: Some(tx),
            queue: rx,
            threads: handles,
            next_id: AtomicU64::new(1),
        })
    }

    /// Queue a run. Returns immediately.
    ///
    /// An unknown budget label completes right away with `InvalidBudget`
    /// and never reaches a worker thread.
    pub fn submit(&self, image: Arc<SourceImage>, budget: &str) -> RunHandle {
        let run_id = RunId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let cancel = CancellationToken::new();
        let (reply, completion) = bounded(1);

        let handle = RunHandle {
            id: run_id,
            cancel: cancel.clone(),
            completion,
        };

        let budget = match budget.parse::<BudgetPreset>() {
            Ok(budget) => budget,
            Err(err) => {
                debug!(%run_id, error = %err, "rejected at submission");
                let _ = reply.send(Completion {
                    run_id,
                    outcome: CompressionOutcome::Failed(err),
                });
                return handle;
            }
        };

        let job = Job {
            run_id,
            image,
            budget,
            cancel,
            reply,
        };

        // A closed queue drops the reply sender; the handle then reports
        // `WorkerUnavailable`.
        if let Some(jobs) = &self.jobs {
            if jobs.send(job).is_err() {
                error!(%run_id, "worker queue closed");
            }
        }

        handle
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.threads.len()
    }
}

impl Drop for CompressionWorker {
    fn drop(&mut self) {
        // Queued runs are dropped unstarted; their handles resolve to
        // `WorkerUnavailable`. Runs already on a thread finish.
        self.jobs.take();
        let dropped = self.queue.try_iter().count();
        if dropped > 0 {
            debug!(dropped, "discarded queued runs on shutdown");
        }
        for handle in self.threads.drain(..) {
            if handle.join().is_err() {
                error!("compression worker thread panicked");
            }
        }
    }
}

fn worker_loop<E: Encoder>(compressor: &Compressor<E>, jobs: &Receiver<Job>) {
    while let Ok(job) = jobs.recv() {
        debug!(run_id = %job.run_id, budget = %job.budget, "run started");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            compressor.run(&job.image, job.budget, &job.cancel)
        }))
        .unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "encoder panicked".to_string());
            error!(run_id = %job.run_id, %message, "run panicked");
            CompressionOutcome::Failed(CompressError::EncoderError(message))
        });

        // The caller may have dropped its handle; that is how stale runs are discarded.
        let _ = job.reply.send(Completion {
            run_id: job.run_id,
            outcome,
        });
    }
}
