//! Task consumers and the handlers they run.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::util::clock::{as_millis_f64, Clock};

use super::{CompletionLatch, PriorityTier, SchedulerQueue, Task};

/// What a consumer observed about one processed task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedTask {
    /// Consumer that processed the task.
    pub consumer_id: usize,
    /// Static tier of the task.
    pub tier: PriorityTier,
    /// Rendered payload.
    pub payload: String,
    /// Time between creation and extraction.
    pub age: Duration,
    /// Whether `age` exceeded the age threshold.
    pub aged: bool,
}

impl ProcessedTask {
    /// Age in fractional milliseconds.
    #[must_use]
    pub fn age_ms(&self) -> f64 {
        as_millis_f64(self.age)
    }
}

/// Processing step run by a consumer for every task it extracts.
///
/// Called from the consumer's own thread, so blocking work is fine.
pub trait TaskHandler<P>: Send + Sync + 'static {
    /// Process one task.
    fn handle(&self, record: &ProcessedTask, task: Task<P>);
}

/// Handler that simulates work by sleeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandler {
    work: Duration,
}

impl LoggingHandler {
    /// Sleep for `work` per task.
    #[must_use]
    pub const fn new(work: Duration) -> Self {
        Self { work }
    }
}

impl<P: Send + 'static> TaskHandler<P> for LoggingHandler {
    fn handle(&self, _record: &ProcessedTask, _task: Task<P>) {
        if !self.work.is_zero() {
            thread::sleep(self.work);
        }
    }
}

/// Handler that keeps every record, in processing order across all consumers.
#[derive(Debug, Clone, Default)]
pub struct CollectingHandler {
    records: Arc<Mutex<Vec<ProcessedTask>>>,
    work: Duration,
}

impl CollectingHandler {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `work` after recording each task.
    #[must_use]
    pub fn with_work(mut self, work: Duration) -> Self {
        self.work = work;
        self
    }

    /// Snapshot of collected records.
    #[must_use]
    pub fn records(&self) -> Vec<ProcessedTask> {
        self.records.lock().clone()
    }

    /// Number of collected records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P: Send + 'static> TaskHandler<P> for CollectingHandler {
    fn handle(&self, record: &ProcessedTask, _task: Task<P>) {
        self.records.lock().push(record.clone());
        if !self.work.is_zero() {
            thread::sleep(self.work);
        }
    }
}

/// Drains a queue until it is closed or the expected task count is reached.
#[derive(Debug, Clone)]
pub struct Consumer<H> {
    id: usize,
    handler: H,
}

impl<H> Consumer<H> {
    /// Create a consumer with the given handler.
    pub const fn new(id: usize, handler: H) -> Self {
        Self { id, handler }
    }

    /// Consumer identifier.
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Run the consume loop and return how many tasks this consumer processed.
    ///
    /// Exits when the queue reports [`Closed`](super::DequeueError::Closed) or when
    /// this consumer's count-down brings `latch` to zero.
    pub fn run<P, C>(&self, queue: &SchedulerQueue<P, C>, latch: &CompletionLatch) -> usize
    where
        P: fmt::Display,
        C: Clock,
        H: TaskHandler<P>,
    {
        let mut processed = 0;
        while !latch.is_done() {
            let task = match queue.dequeue() {
                Ok(task) => task,
                Err(e) => {
                    debug!(consumer_id = self.id, reason = %e, "Consumer stopping");
                    break;
                }
            };

            let now = queue.clock().now();
            let age = task.age(now);
            let record = ProcessedTask {
                consumer_id: self.id,
                tier: task.tier(),
                payload: task.payload().to_string(),
                age,
                aged: queue.policy().is_aged(&task, now),
            };
            info!(
                consumer_id = self.id,
                tier = %record.tier,
                payload = %record.payload,
                age_ms = record.age_ms(),
                aged = record.aged,
                "Consumed task"
            );

            self.handler.handle(&record, task);
            processed += 1;

            if latch.count_down() == 0 {
                debug!(consumer_id = self.id, "Expected task count reached");
                break;
            }
        }
        processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AgingPolicy;
    use crate::util::ManualClock;

    #[test]
    fn test_consumer_stops_at_latch_zero() {
        let queue = SchedulerQueue::new(AgingPolicy::default());
        for i in 0..5 {
            queue.enqueue(Task::new(PriorityTier::Medium, i));
        }
        let latch = CompletionLatch::new(3);
        let handler = CollectingHandler::new();
        let consumer = Consumer::new(1, handler.clone());

        assert_eq!(consumer.run(&queue, &latch), 3);
        assert_eq!(handler.len(), 3);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_consumer_exits_on_close() {
        let queue = SchedulerQueue::<u32>::new(AgingPolicy::default());
        queue.close();
        let latch = CompletionLatch::new(10);
        let consumer = Consumer::new(0, LoggingHandler::default());

        assert_eq!(consumer.run(&queue, &latch), 0);
        assert_eq!(latch.remaining(), 10);
    }

    #[test]
    fn test_record_reports_age_and_aged_flag() {
        let clock = ManualClock::new();
        let queue = SchedulerQueue::with_clock(AgingPolicy::from_millis(100), clock.clone());
        queue.enqueue(Task::with_created_at(PriorityTier::Low, "old", clock.now()));
        clock.advance(Duration::from_millis(150));
        queue.enqueue(Task::with_created_at(PriorityTier::Low, "new", clock.now()));

        let latch = CompletionLatch::new(2);
        let handler = CollectingHandler::new();
        Consumer::new(7, handler.clone()).run(&queue, &latch);

        let records = handler.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].payload, "old");
        assert_eq!(records[0].age, Duration::from_millis(150));
        assert!(records[0].aged);
        assert_eq!(records[1].payload, "new");
        assert!(!records[1].aged);
        assert_eq!(records[1].consumer_id, 7);
    }
}
