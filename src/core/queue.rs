//! Concurrent scheduler queue with extraction-time aging.
//!
//! Tasks are kept in one min-heap per tier, keyed on `(created_at, arrival)`. Order
//! within a tier never depends on the current time, so a heap is safe there. Order
//! *across* tiers does depend on time, so it is decided fresh on every extraction: the
//! queue samples its clock, takes the heads of the highest occupied tier and the tier
//! directly below it, and keeps whichever head the [`AgingPolicy`] ranks first at that
//! instant. Lower heads are not considered, so promotion never spans two tiers.
//!
//! # Design
//!
//! - One `parking_lot::Mutex` guards all resident tasks; a `Condvar` parks consumers
//!   while the queue is empty.
//! - `enqueue` never blocks and never fails.
//! - `close` wakes every waiter; from then on every dequeue reports
//!   [`DequeueError::Closed`]. Tasks still resident can be recovered with `drain`.
//! - Atomic counters back `len` and `stats`, so they are readable without the lock.

use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info};

use crate::util::clock::{as_millis_f64, Clock, MonotonicClock};

use super::{AgingPolicy, DequeueError, PriorityTier, Task};

/// Resident task tagged with its arrival sequence number.
struct Resident<P> {
    seq: u64,
    task: Task<P>,
}

impl<P> PartialEq for Resident<P> {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl<P> Eq for Resident<P> {}

impl<P> PartialOrd for Resident<P> {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl<P> Ord for Resident<P> {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        // Reversed for max-heap: earliest creation, then earliest arrival, on top.
        other
            .task
            .created_at()
            .cmp(&self.task.created_at())
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A task removed from the state, with whether aging let it jump a resident higher tier.
struct Extracted<P> {
    task: Task<P>,
    promoted: bool,
}

struct QueueState<P> {
    tiers: [BinaryHeap<Resident<P>>; PriorityTier::COUNT],
    closed: bool,
    next_seq: u64,
}

impl<P> QueueState<P> {
    fn new() -> Self {
        Self {
            tiers: std::array::from_fn(|_| BinaryHeap::new()),
            closed: false,
            next_seq: 0,
        }
    }

    fn push(&mut self, task: Task<P>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tiers[task.tier().index()].push(Resident { seq, task });
    }

    /// Tier index holding the task ranked first at `now`.
    ///
    /// Only the highest occupied tier and the one directly below it are candidates: a
    /// head two tiers down loses to the highest head regardless of age, even when aging
    /// makes the pairwise order cyclic.
    fn select(&self, policy: &AgingPolicy, now: Instant) -> Option<usize> {
        let highest = self.tiers.iter().position(|heap| !heap.is_empty())?;
        let mut best: Option<(usize, &Resident<P>)> = None;
        for (idx, heap) in self.tiers.iter().enumerate().skip(highest).take(2) {
            let Some(head) = heap.peek() else {
                continue;
            };
            best = match best {
                Some((_, current)) if !precedes(policy, head, current, now) => best,
                _ => Some((idx, head)),
            };
        }
        best.map(|(idx, _)| idx)
    }

    fn pop_next(&mut self, policy: &AgingPolicy, now: Instant) -> Option<Extracted<P>> {
        let idx = self.select(policy, now)?;
        let highest_occupied = self.tiers.iter().position(|heap| !heap.is_empty())?;
        let resident = self.tiers[idx].pop()?;
        Some(Extracted {
            task: resident.task,
            promoted: idx > highest_occupied,
        })
    }

    fn len(&self) -> usize {
        self.tiers.iter().map(BinaryHeap::len).sum()
    }
}

fn precedes<P>(policy: &AgingPolicy, a: &Resident<P>, b: &Resident<P>, now: Instant) -> bool {
    match policy.compare(&a.task, &b.task, now) {
        CmpOrdering::Less => true,
        CmpOrdering::Greater => false,
        CmpOrdering::Equal => a.seq < b.seq,
    }
}

/// Point-in-time queue statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Tasks accepted by `enqueue`.
    pub enqueued: u64,
    /// Tasks handed to consumers.
    pub dequeued: u64,
    /// Extractions where aging served a task ahead of a resident higher tier.
    pub promoted: u64,
    /// Tasks currently resident.
    pub resident: usize,
}

#[derive(Debug, Default)]
struct QueueCounters {
    enqueued: AtomicU64,
    dequeued: AtomicU64,
    promoted: AtomicU64,
}

/// Thread-safe, unbounded priority queue whose extraction order honors aging.
///
/// Share it between producers and consumers with an `Arc`.
pub struct SchedulerQueue<P, C = MonotonicClock> {
    policy: AgingPolicy,
    clock: C,
    state: Mutex<QueueState<P>>,
    available: Condvar,
    resident: AtomicUsize,
    counters: QueueCounters,
    #[cfg(feature = "tokio-runtime")]
    async_waiters: tokio::sync::Notify,
}

impl<P> SchedulerQueue<P, MonotonicClock> {
    /// Create a queue driven by the process monotonic clock.
    #[must_use]
    pub fn new(policy: AgingPolicy) -> Self {
        Self::with_clock(policy, MonotonicClock)
    }
}

impl<P> Default for SchedulerQueue<P, MonotonicClock> {
    fn default() -> Self {
        Self::new(AgingPolicy::default())
    }
}

impl<P, C: Clock> SchedulerQueue<P, C> {
    /// Create a queue that reads "now" from `clock` on every extraction.
    pub fn with_clock(policy: AgingPolicy, clock: C) -> Self {
        Self {
            policy,
            clock,
            state: Mutex::new(QueueState::new()),
            available: Condvar::new(),
            resident: AtomicUsize::new(0),
            counters: QueueCounters::default(),
            #[cfg(feature = "tokio-runtime")]
            async_waiters: tokio::sync::Notify::new(),
        }
    }

    /// Ordering policy in use.
    pub const fn policy(&self) -> &AgingPolicy {
        &self.policy
    }

    /// Clock in use.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Insert a task. Never blocks and always succeeds.
    ///
    /// A task enqueued after [`close`](Self::close) is retained and returned by
    /// [`drain`](Self::drain); no consumer will receive it.
    pub fn enqueue(&self, task: Task<P>) {
        let tier = task.tier();
        {
            let mut state = self.state.lock();
            if state.closed {
                debug!(tier = %tier, "Task enqueued after close, retained for drain");
            }
            state.push(task);
            self.resident.fetch_add(1, Ordering::Relaxed);
            self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
        }
        self.available.notify_one();
        #[cfg(feature = "tokio-runtime")]
        self.async_waiters.notify_one();
    }

    /// Remove the task ranked first right now, blocking while the queue is empty.
    ///
    /// # Errors
    ///
    /// Returns [`DequeueError::Closed`] once the queue has been closed, whether the
    /// caller was already waiting or called afterwards.
    pub fn dequeue(&self) -> Result<Task<P>, DequeueError> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(DequeueError::Closed);
            }
            if let Some(task) = self.take_next(&mut state) {
                return Ok(task);
            }
            self.available.wait(&mut state);
        }
    }

    /// Like [`dequeue`](Self::dequeue) but waits at most `timeout`.
    ///
    /// # Errors
    ///
    /// - [`DequeueError::Closed`] if the queue is or becomes closed
    /// - [`DequeueError::TimedOut`] if nothing arrived in time
    pub fn dequeue_timeout(&self, timeout: Duration) -> Result<Task<P>, DequeueError> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(DequeueError::Closed);
            }
            if let Some(task) = self.take_next(&mut state) {
                return Ok(task);
            }
            if Instant::now() >= deadline {
                return Err(DequeueError::TimedOut);
            }
            let _ = self.available.wait_until(&mut state, deadline);
        }
    }

    /// Non-blocking dequeue. `Ok(None)` means the queue is empty.
    ///
    /// # Errors
    ///
    /// Returns [`DequeueError::Closed`] once the queue has been closed.
    pub fn try_dequeue(&self) -> Result<Option<Task<P>>, DequeueError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(DequeueError::Closed);
        }
        Ok(self.take_next(&mut state))
    }

    /// Async dequeue for consumers running on a tokio runtime.
    ///
    /// Dropping the returned future before it completes never removes a task.
    ///
    /// # Errors
    ///
    /// Returns [`DequeueError::Closed`] once the queue has been closed.
    #[cfg(feature = "tokio-runtime")]
    pub async fn dequeue_async(&self) -> Result<Task<P>, DequeueError> {
        loop {
            let mut notified = std::pin::pin!(self.async_waiters.notified());
            // Register before checking so a close or enqueue in between is not missed.
            notified.as_mut().enable();
            if let Some(task) = self.try_dequeue()? {
                return Ok(task);
            }
            notified.await;
        }
    }

    /// Close the queue and wake every waiter. Idempotent.
    pub fn close(&self) {
        {
            let mut state = self.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
        }
        info!(resident = self.len(), "Scheduler queue closed");
        self.available.notify_all();
        #[cfg(feature = "tokio-runtime")]
        self.async_waiters.notify_waiters();
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Remove every resident task, in the order they would have been served now.
    ///
    /// Works on open and closed queues. Drained tasks do not count as dequeued.
    pub fn drain(&self) -> Vec<Task<P>> {
        let mut state = self.state.lock();
        let now = self.clock.now();
        let mut drained = Vec::with_capacity(state.len());
        while let Some(extracted) = state.pop_next(&self.policy, now) {
            drained.push(extracted.task);
        }
        self.resident.store(0, Ordering::Relaxed);
        drained
    }

    /// Number of resident tasks. Best effort under concurrency.
    pub fn len(&self) -> usize {
        self.resident.load(Ordering::Relaxed)
    }

    /// Whether no task is resident. Best effort under concurrency.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of queue counters.
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            enqueued: self.counters.enqueued.load(Ordering::Relaxed),
            dequeued: self.counters.dequeued.load(Ordering::Relaxed),
            promoted: self.counters.promoted.load(Ordering::Relaxed),
            resident: self.len(),
        }
    }

    fn take_next(&self, state: &mut QueueState<P>) -> Option<Task<P>> {
        let now = self.clock.now();
        let Extracted { task, promoted } = state.pop_next(&self.policy, now)?;
        self.resident.fetch_sub(1, Ordering::Relaxed);
        self.counters.dequeued.fetch_add(1, Ordering::Relaxed);
        if promoted {
            self.counters.promoted.fetch_add(1, Ordering::Relaxed);
        }
        debug!(
            tier = %task.tier(),
            age_ms = as_millis_f64(task.age(now)),
            promoted,
            "Task dequeued"
        );
        Some(task)
    }
}
