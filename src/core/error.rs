//! Error types for scheduler operations.

use thiserror::Error;

/// Errors produced while setting up the scheduler or its workers.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Configuration rejected before any worker started.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker: {0}")]
    Spawn(String),
}

/// Non-success outcomes of a dequeue.
///
/// `Closed` is the cancellation signal: an expected result during shutdown, not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DequeueError {
    /// The queue was closed; no further tasks will be handed out.
    #[error("queue closed")]
    Closed,
    /// No task became available within the requested timeout.
    #[error("dequeue timed out")]
    TimedOut,
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
