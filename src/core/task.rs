//! Immutable task records.

use std::time::{Duration, Instant};

use super::PriorityTier;

/// A unit of work awaiting extraction.
///
/// Fields are private: a task never changes after construction. `created_at` is taken
/// from the monotonic clock exactly once.
#[derive(Debug, Clone)]
pub struct Task<P> {
    tier: PriorityTier,
    payload: P,
    created_at: Instant,
}

impl<P> Task<P> {
    /// Create a task stamped with the current monotonic instant.
    pub fn new(tier: PriorityTier, payload: P) -> Self {
        Self::with_created_at(tier, payload, Instant::now())
    }

    /// Create a task with an explicit creation instant, e.g. from a
    /// [`ManualClock`](crate::util::ManualClock).
    pub const fn with_created_at(tier: PriorityTier, payload: P, created_at: Instant) -> Self {
        Self {
            tier,
            payload,
            created_at,
        }
    }

    /// Static tier.
    #[must_use]
    pub const fn tier(&self) -> PriorityTier {
        self.tier
    }

    /// Borrow the payload.
    pub const fn payload(&self) -> &P {
        &self.payload
    }

    /// Creation instant.
    #[must_use]
    pub const fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Time spent waiting as of `now`. Zero if `now` precedes creation.
    #[must_use]
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// Whether the task has waited strictly longer than `threshold`.
    #[must_use]
    pub fn is_aged(&self, threshold: Duration, now: Instant) -> bool {
        self.age(now) > threshold
    }

    /// Consume the task, returning its payload.
    pub fn into_payload(self) -> P {
        self.payload
    }
}
