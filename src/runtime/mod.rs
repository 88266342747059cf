//! Runtime harness that drives producers and consumers on OS threads.

pub mod harness;

pub use harness::{Harness, JoinFailureKind, RunReport, WorkerJoinFailure, WorkerRole};
