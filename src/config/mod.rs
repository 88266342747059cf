//! Configuration models for the scheduler harness.

pub mod harness;

pub use harness::{HarnessConfig, TierSelection};
