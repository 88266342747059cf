//! Producer/consumer harness driving a shared [`SchedulerQueue`] on OS threads.
//!
//! A run spawns the consumers, then the producers, waits until the expected number of
//! tasks has been processed, closes the queue and joins every worker with a bounded
//! timeout. Workers that miss the timeout are detached and reported; this is never
//! fatal to the run.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, RecvTimeoutError};
use tracing::{debug, info, info_span, warn, Span};
use uuid::Uuid;

use crate::config::HarnessConfig;
use crate::core::{
    CompletionLatch, Consumer, LoggingHandler, Producer, QueueStats, SchedulerError,
    SchedulerQueue, TaskHandler,
};

/// How often the coordinator re-checks worker liveness while waiting for completion.
const WATCHDOG_INTERVAL: Duration = Duration::from_millis(50);

/// Role of a worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerRole {
    /// Creates and enqueues tasks.
    Producer,
    /// Dequeues and processes tasks.
    Consumer,
}

impl fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Producer => f.write_str("producer"),
            Self::Consumer => f.write_str("consumer"),
        }
    }
}

/// Why a worker could not be joined cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinFailureKind {
    /// Still running after the join timeout; the thread was detached.
    TimedOut,
    /// The worker thread panicked.
    Panicked,
}

/// A worker that did not shut down cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerJoinFailure {
    /// Worker role.
    pub role: WorkerRole,
    /// Worker index within its role.
    pub worker_id: usize,
    /// Failure kind.
    pub kind: JoinFailureKind,
}

/// Outcome of a harness run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Identifier attached to every log line of the run.
    pub run_id: Uuid,
    /// Tasks enqueued by producers.
    pub produced: u64,
    /// Tasks fully processed by consumers.
    pub consumed: usize,
    /// Tasks still resident at shutdown, removed by draining the queue.
    pub leftover: usize,
    /// Wall time of the run.
    pub elapsed: Duration,
    /// Workers that timed out or panicked.
    pub join_failures: Vec<WorkerJoinFailure>,
    /// Queue counters at shutdown.
    pub queue_stats: QueueStats,
}

impl RunReport {
    /// Whether every worker exited cleanly and nothing was left behind.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.join_failures.is_empty() && self.leftover == 0
    }
}

struct Worker {
    role: WorkerRole,
    id: usize,
    handle: JoinHandle<usize>,
}

/// Runs producers and consumers against one queue until `total_tasks` are consumed.
#[derive(Debug, Clone)]
pub struct Harness {
    config: HarnessConfig,
}

impl Harness {
    /// Create a harness, validating the configuration up front.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfiguration`] if validation fails.
    pub fn new(config: HarnessConfig) -> Result<Self, SchedulerError> {
        config
            .validate()
            .map_err(SchedulerError::InvalidConfiguration)?;
        Ok(Self { config })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run with a [`LoggingHandler`] that sleeps `work_ms` per task.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Spawn`] if a worker thread could not be started.
    pub fn run(&self) -> Result<RunReport, SchedulerError> {
        self.run_with(LoggingHandler::new(self.config.work_duration()))
    }

    /// Run with a custom handler cloned into every consumer.
    ///
    /// `work_ms` is not applied here: simulated work is up to the handler, for example
    /// [`CollectingHandler::with_work`](crate::core::CollectingHandler::with_work).
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Spawn`] if a worker thread could not be started. Any
    /// workers already running are released by closing the queue first.
    pub fn run_with<H>(&self, handler: H) -> Result<RunReport, SchedulerError>
    where
        H: TaskHandler<String> + Clone,
    {
        let cfg = &self.config;
        let run_id = Uuid::new_v4();
        let span = info_span!("harness_run", %run_id);
        let _entered = span.enter();

        info!(
            total_tasks = cfg.total_tasks,
            producers = cfg.producer_count,
            consumers = cfg.consumer_count,
            age_threshold_ms = cfg.age_threshold_ms,
            "Starting scheduler run"
        );

        let started = Instant::now();
        let queue = Arc::new(SchedulerQueue::<String>::new(cfg.aging_policy()));
        let latch = Arc::new(CompletionLatch::new(cfg.total_tasks));

        let mut workers = Vec::with_capacity(cfg.consumer_count + cfg.producer_count);
        for id in 0..cfg.consumer_count {
            let consumer = Consumer::new(id, handler.clone());
            let worker_queue = Arc::clone(&queue);
            let worker_latch = Arc::clone(&latch);
            let worker = spawn_worker(WorkerRole::Consumer, id, move || {
                consumer.run(&worker_queue, &worker_latch)
            });
            match worker {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    queue.close();
                    return Err(e);
                }
            }
        }

        let per_producer = cfg.total_tasks / cfg.producer_count;
        let remainder = cfg.total_tasks % cfg.producer_count;
        for id in 0..cfg.producer_count {
            let task_count = per_producer + usize::from(id < remainder);
            let producer = Producer::new(id, task_count, cfg.tier_selection);
            let worker_queue = Arc::clone(&queue);
            let worker = spawn_worker(WorkerRole::Producer, id, move || {
                producer.run(&worker_queue, |index, tier| {
                    format!("producer-{id} {tier} #{index}")
                })
            });
            match worker {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    queue.close();
                    return Err(e);
                }
            }
        }

        self.await_completion(&queue, &latch, &workers);

        queue.close();
        let join_timeout = cfg.join_timeout();
        let join_failures: Vec<_> = workers
            .into_iter()
            .filter_map(|worker| join_worker(worker, join_timeout))
            .collect();

        let leftover = queue.drain().len();
        if leftover > 0 {
            warn!(leftover, "Tasks left in queue at shutdown");
        }

        let report = RunReport {
            run_id,
            produced: queue.stats().enqueued,
            consumed: cfg.total_tasks - latch.remaining(),
            leftover,
            elapsed: started.elapsed(),
            join_failures,
            queue_stats: queue.stats(),
        };
        info!(
            produced = report.produced,
            consumed = report.consumed,
            promoted = report.queue_stats.promoted,
            elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
            join_failures = report.join_failures.len(),
            "Scheduler run complete"
        );
        Ok(report)
    }

    /// Wait for the latch, bailing out if the workers can no longer reach it.
    fn await_completion(
        &self,
        queue: &SchedulerQueue<String>,
        latch: &CompletionLatch,
        workers: &[Worker],
    ) {
        let expected = u64::try_from(self.config.total_tasks).unwrap_or(u64::MAX);
        while !latch.wait_timeout(WATCHDOG_INTERVAL) {
            let finished = |role: WorkerRole| {
                workers
                    .iter()
                    .filter(|w| w.role == role)
                    .all(|w| w.handle.is_finished())
            };
            if finished(WorkerRole::Consumer) {
                warn!(
                    remaining = latch.remaining(),
                    "All consumers exited before the expected task count was reached"
                );
                return;
            }
            if finished(WorkerRole::Producer) && queue.stats().enqueued < expected {
                warn!(
                    enqueued = queue.stats().enqueued,
                    expected, "Producers exited without enqueueing every task"
                );
                return;
            }
        }
        debug!("Expected task count reached");
    }
}

fn spawn_worker<F>(role: WorkerRole, id: usize, work: F) -> Result<Worker, SchedulerError>
where
    F: FnOnce() -> usize + Send + 'static,
{
    let span = Span::current();
    let handle = thread::Builder::new()
        .name(format!("aging-{role}-{id}"))
        .spawn(move || {
            let _entered = span.enter();
            debug!(%role, worker_id = id, "Worker thread started");
            let handled = work();
            debug!(%role, worker_id = id, handled, "Worker thread exiting");
            handled
        })
        .map_err(|e| SchedulerError::Spawn(format!("{role} {id}: {e}")))?;
    Ok(Worker { role, id, handle })
}

/// Join a worker, giving up after `timeout`. A worker that misses the deadline is
/// detached: threads cannot be killed, so it is left to finish on its own.
fn join_worker(worker: Worker, timeout: Duration) -> Option<WorkerJoinFailure> {
    let Worker { role, id, handle } = worker;
    let failure = |kind| {
        Some(WorkerJoinFailure {
            role,
            worker_id: id,
            kind,
        })
    };

    let (tx, rx) = bounded(1);
    let joiner = thread::spawn(move || {
        let _ = tx.send(handle.join().is_ok());
    });

    match rx.recv_timeout(timeout) {
        Ok(true) => {
            let _ = joiner.join();
            debug!(%role, worker_id = id, "Worker joined");
            None
        }
        Ok(false) => {
            let _ = joiner.join();
            warn!(%role, worker_id = id, "Worker panicked");
            failure(JoinFailureKind::Panicked)
        }
        Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
            warn!(
                %role,
                worker_id = id,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                "Worker did not exit within timeout, detaching"
            );
            failure(JoinFailureKind::TimedOut)
        }
    }
}
