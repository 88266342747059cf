//! Aging-aware ordering between tasks.
//!
//! The comparison depends on `now`: a lower-tier task that has waited longer than the
//! threshold gets one tier of promotion credit. Results must never be cached, since the
//! same pair can compare differently a few milliseconds later.
//!
//! # Rules
//!
//! - Same tier: the older task goes first.
//! - Tiers one apart: an aged lower-tier task ties with the higher tier, and the tie
//!   falls back to age.
//! - Tiers two or more apart: the higher tier always wins. Promotion never exceeds one step.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use super::Task;

/// Default waiting time after which a task is considered aged.
pub const DEFAULT_AGE_THRESHOLD: Duration = Duration::from_millis(100);

/// The ordering function, parameterized by its age threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgingPolicy {
    threshold: Duration,
}

impl AgingPolicy {
    /// Create a policy with the given age threshold.
    #[must_use]
    pub const fn new(threshold: Duration) -> Self {
        Self { threshold }
    }

    /// Create a policy from a threshold in milliseconds.
    #[must_use]
    pub const fn from_millis(threshold_ms: u64) -> Self {
        Self::new(Duration::from_millis(threshold_ms))
    }

    /// Age threshold.
    #[must_use]
    pub const fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Whether `task` has waited longer than the threshold at `now`.
    #[must_use]
    pub fn is_aged<P>(&self, task: &Task<P>, now: Instant) -> bool {
        task.is_aged(self.threshold, now)
    }

    /// Tier rank after applying the one-step promotion credit.
    #[must_use]
    pub fn effective_rank<P>(&self, task: &Task<P>, now: Instant) -> u8 {
        let rank = task.tier().rank();
        if self.is_aged(task, now) {
            rank.saturating_sub(1)
        } else {
            rank
        }
    }

    /// Compare `a` against `b` at instant `now`.
    ///
    /// `Less` means `a` is served first. `Equal` is only returned for same-tier (or
    /// promoted-into-tie) tasks created at the same instant; callers break that tie by
    /// arrival order.
    #[must_use]
    pub fn compare<P>(&self, a: &Task<P>, b: &Task<P>, now: Instant) -> Ordering {
        let rank_diff = i16::from(a.tier().rank()) - i16::from(b.tier().rank());
        let age_a = a.age(now);
        let age_b = b.age(now);

        let mut adjusted = rank_diff;
        if rank_diff > 0 && age_a > self.threshold {
            adjusted -= 1;
        } else if rank_diff < 0 && age_b > self.threshold {
            adjusted += 1;
        }

        match adjusted.cmp(&0) {
            // Older first: larger age sorts before.
            Ordering::Equal => age_b.cmp(&age_a),
            other => other,
        }
    }
}

impl Default for AgingPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_AGE_THRESHOLD)
    }
}
