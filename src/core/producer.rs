//! Task producers.

use rand::Rng;
use tracing::debug;

use crate::config::TierSelection;
use crate::util::clock::Clock;

use super::{PriorityTier, SchedulerQueue, Task};

/// Creates a fixed number of tasks and enqueues them.
///
/// Producers never coordinate with each other; the queue does all synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Producer {
    id: usize,
    task_count: usize,
    selection: TierSelection,
}

impl Producer {
    /// Create a producer that will emit `task_count` tasks.
    #[must_use]
    pub const fn new(id: usize, task_count: usize, selection: TierSelection) -> Self {
        Self {
            id,
            task_count,
            selection,
        }
    }

    /// Producer identifier.
    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Number of tasks this producer emits.
    #[must_use]
    pub const fn task_count(&self) -> usize {
        self.task_count
    }

    /// Tier for the task at `index`.
    pub fn tier_for<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> PriorityTier {
        match self.selection {
            TierSelection::Fixed(tier) => tier,
            TierSelection::RoundRobin => PriorityTier::ALL[index % PriorityTier::COUNT],
            TierSelection::Random => PriorityTier::ALL[rng.random_range(0..PriorityTier::COUNT)],
        }
    }

    /// Build and enqueue every task, returning how many were produced.
    ///
    /// `make_payload` receives the task index and its tier. Each task's creation time
    /// is read from the queue's clock right before it is enqueued.
    pub fn run<P, C, F>(&self, queue: &SchedulerQueue<P, C>, mut make_payload: F) -> usize
    where
        C: Clock,
        F: FnMut(usize, PriorityTier) -> P,
    {
        let mut rng = rand::rng();
        for index in 0..self.task_count {
            let tier = self.tier_for(index, &mut rng);
            let payload = make_payload(index, tier);
            queue.enqueue(Task::with_created_at(tier, payload, queue.clock().now()));
        }
        debug!(producer_id = self.id, produced = self.task_count, "Producer finished");
        self.task_count
    }
}
