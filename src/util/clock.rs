//! Monotonic clock sources.
//!
//! Task ages are measured against [`Instant`], never wall-clock time, so clock
//! adjustments cannot reorder the queue. The [`Clock`] trait lets the queue be driven
//! by a [`ManualClock`] in tests and simulations.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// A source of monotonic instants.
pub trait Clock: Send + Sync + 'static {
    /// Current instant. Must never go backwards between calls.
    fn now(&self) -> Instant;
}

/// The process monotonic clock (`Instant::now`).
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can hand one clone to a queue
/// and keep another to advance it.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<Instant>>,
}

impl ManualClock {
    /// Start the clock at the current process instant.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Start the clock at a specific instant.
    #[must_use]
    pub fn starting_at(start: Instant) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock();
        *current += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.current.lock()
    }
}

/// Convert a duration to fractional milliseconds for log output.
#[must_use]
pub fn as_millis_f64(d: Duration) -> f64 {
    d.as_secs_f64() * 1_000.0
}
