//! Countdown latch used to signal that an expected number of tasks was processed.

use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// Releases waiters once `count_down` has been called `count` times.
///
/// The latch belongs to whoever coordinates a run, not to the queue: consumers count
/// down after each processed task and the coordinator waits for zero.
#[derive(Debug)]
pub struct CompletionLatch {
    remaining: Mutex<usize>,
    zero: Condvar,
}

impl CompletionLatch {
    /// Create a latch expecting `count` completions.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            remaining: Mutex::new(count),
            zero: Condvar::new(),
        }
    }

    /// Record one completion and return how many remain. Saturates at zero.
    pub fn count_down(&self) -> usize {
        let mut remaining = self.remaining.lock();
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            self.zero.notify_all();
        }
        *remaining
    }

    /// Completions still expected.
    pub fn remaining(&self) -> usize {
        *self.remaining.lock()
    }

    /// Whether the count reached zero.
    pub fn is_done(&self) -> bool {
        self.remaining() == 0
    }

    /// Block until the count reaches zero.
    pub fn wait(&self) {
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            self.zero.wait(&mut remaining);
        }
    }

    /// Block until the count reaches zero or `timeout` elapses.
    /// Returns `true` if the count reached zero.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut remaining = self.remaining.lock();
        let result = self
            .zero
            .wait_while_for(&mut remaining, |left| *left > 0, timeout);
        !result.timed_out() || *remaining == 0
    }
}
