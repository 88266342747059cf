//! Producer/consumer harness configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{AgingPolicy, PriorityTier};

/// How a producer picks the tier of each task it creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierSelection {
    /// Uniformly random tier per task.
    #[default]
    Random,
    /// Cycle through tiers highest first: task `i` gets tier `i % 3`.
    RoundRobin,
    /// Every task gets the same tier.
    Fixed(PriorityTier),
}

impl FromStr for TierSelection {
    type Err = String;

    /// Accepts `random`, `round_robin`, or a tier name for a fixed tier.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "round_robin" | "round-robin" => Ok(Self::RoundRobin),
            other => other
                .parse::<PriorityTier>()
                .map(Self::Fixed)
                .map_err(|e| e.to_string()),
        }
    }
}

/// Harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Tasks produced and consumed over the whole run.
    pub total_tasks: usize,
    /// Concurrent producer threads.
    pub producer_count: usize,
    /// Concurrent consumer threads.
    pub consumer_count: usize,
    /// Waiting time in milliseconds after which a task may be promoted one tier.
    pub age_threshold_ms: u64,
    /// Simulated work per processed task, in milliseconds.
    pub work_ms: u64,
    /// Grace period for each worker to exit at shutdown, in milliseconds.
    pub join_timeout_ms: u64,
    /// Tier assignment for produced tasks.
    pub tier_selection: TierSelection,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            total_tasks: 100,
            producer_count: 1,
            consumer_count: num_cpus::get().clamp(1, 4),
            age_threshold_ms: 100,
            work_ms: 0,
            join_timeout_ms: 2_000,
            tier_selection: TierSelection::Random,
        }
    }
}

impl HarnessConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total number of tasks.
    #[must_use]
    pub const fn with_total_tasks(mut self, total_tasks: usize) -> Self {
        self.total_tasks = total_tasks;
        self
    }

    /// Set the number of producers.
    #[must_use]
    pub const fn with_producer_count(mut self, producer_count: usize) -> Self {
        self.producer_count = producer_count;
        self
    }

    /// Set the number of consumers.
    #[must_use]
    pub const fn with_consumer_count(mut self, consumer_count: usize) -> Self {
        self.consumer_count = consumer_count;
        self
    }

    /// Set the age threshold in milliseconds.
    #[must_use]
    pub const fn with_age_threshold_ms(mut self, age_threshold_ms: u64) -> Self {
        self.age_threshold_ms = age_threshold_ms;
        self
    }

    /// Set the simulated work per task in milliseconds.
    #[must_use]
    pub const fn with_work_ms(mut self, work_ms: u64) -> Self {
        self.work_ms = work_ms;
        self
    }

    /// Set the per-worker join timeout in milliseconds.
    #[must_use]
    pub const fn with_join_timeout_ms(mut self, join_timeout_ms: u64) -> Self {
        self.join_timeout_ms = join_timeout_ms;
        self
    }

    /// Set the tier selection mode.
    #[must_use]
    pub const fn with_tier_selection(mut self, tier_selection: TierSelection) -> Self {
        self.tier_selection = tier_selection;
        self
    }

    /// Aging policy derived from `age_threshold_ms`.
    #[must_use]
    pub const fn aging_policy(&self) -> AgingPolicy {
        AgingPolicy::from_millis(self.age_threshold_ms)
    }

    /// Simulated work duration.
    #[must_use]
    pub const fn work_duration(&self) -> Duration {
        Duration::from_millis(self.work_ms)
    }

    /// Per-worker join timeout.
    #[must_use]
    pub const fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.total_tasks == 0 {
            return Err("total_tasks must be greater than 0".into());
        }
        if self.producer_count == 0 {
            return Err("producer_count must be greater than 0".into());
        }
        if self.consumer_count == 0 {
            return Err("consumer_count must be greater than 0".into());
        }
        if self.join_timeout_ms == 0 {
            return Err("join_timeout_ms must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON, unknown tier names, or invalid values.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from the environment, loading `.env` first if present.
    ///
    /// Recognized variables: `AGING_TOTAL_TASKS`, `AGING_PRODUCERS`, `AGING_CONSUMERS`,
    /// `AGING_THRESHOLD_MS`, `AGING_WORK_MS`, `AGING_JOIN_TIMEOUT_MS`, `AGING_TIER`.
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed, or the result is invalid.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();
        if let Some(v) = env_parse("AGING_TOTAL_TASKS")? {
            cfg.total_tasks = v;
        }
        if let Some(v) = env_parse("AGING_PRODUCERS")? {
            cfg.producer_count = v;
        }
        if let Some(v) = env_parse("AGING_CONSUMERS")? {
            cfg.consumer_count = v;
        }
        if let Some(v) = env_parse("AGING_THRESHOLD_MS")? {
            cfg.age_threshold_ms = v;
        }
        if let Some(v) = env_parse("AGING_WORK_MS")? {
            cfg.work_ms = v;
        }
        if let Some(v) = env_parse("AGING_JOIN_TIMEOUT_MS")? {
            cfg.join_timeout_ms = v;
        }
        if let Some(v) = env_parse("AGING_TIER")? {
            cfg.tier_selection = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("{key}={raw:?}: {e}")),
        Err(_) => Ok(None),
    }
}
