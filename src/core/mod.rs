//! Core scheduling abstractions: tiers, tasks, ordering, the queue and its workers.

pub mod consumer;
pub mod error;
pub mod latch;
pub mod ordering;
pub mod producer;
pub mod queue;
pub mod task;
pub mod tier;

pub use consumer::{CollectingHandler, Consumer, LoggingHandler, ProcessedTask, TaskHandler};
pub use error::{AppResult, DequeueError, SchedulerError};
pub use latch::CompletionLatch;
pub use ordering::{AgingPolicy, DEFAULT_AGE_THRESHOLD};
pub use producer::Producer;
pub use queue::{QueueStats, SchedulerQueue};
pub use task::Task;
pub use tier::PriorityTier;
