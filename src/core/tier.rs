//! Static priority tiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::SchedulerError;

/// Severity classes ordered from most to least urgent.
///
/// Ranks are contiguous from 0 in declaration order, so `High` is served first and
/// adjacent tiers are exactly one rank apart. Adding a tier means appending it here
/// and to [`PriorityTier::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    /// Served first.
    High,
    /// Served after `High`.
    Medium,
    /// Served last unless promoted by aging.
    Low,
}

impl PriorityTier {
    /// All tiers, highest first.
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Number of tiers.
    pub const COUNT: usize = 3;

    /// Rank of this tier; lower is served first.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    /// Index into per-tier arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self.rank() as usize
    }

    /// Look up a tier by rank.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfiguration`] when `rank` is outside the
    /// declared tiers.
    pub fn from_rank(rank: u8) -> Result<Self, SchedulerError> {
        Self::ALL.get(usize::from(rank)).copied().ok_or_else(|| {
            SchedulerError::InvalidConfiguration(format!(
                "tier rank {rank} out of range 0..{}",
                Self::COUNT
            ))
        })
    }

    /// Lowercase name used in config and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriorityTier {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SchedulerError::InvalidConfiguration(format!("unknown tier `{s}`")))
    }
}
