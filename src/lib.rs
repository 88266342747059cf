//! # Aging Scheduler
//!
//! An aging-aware concurrent priority scheduler: a shared task queue fed by any number
//! of producer threads and drained by any number of consumer threads.
//!
//! Tasks carry a static [`PriorityTier`]. Higher tiers are served first, but a task that
//! has waited longer than the age threshold is promoted by exactly one tier, so low
//! priority work cannot starve behind a steady stream of medium priority work.
//!
//! ## Core Problem Solved
//!
//! The promotion rule depends on the current time, so the relative order of two resident
//! tasks can change while both sit in the queue. A binary heap built with such a
//! comparator silently goes stale. [`SchedulerQueue`] keeps a time-independent heap per
//! tier and decides between tiers only at the instant of extraction.
//!
//! ## Key Features
//!
//! - **Extraction-time ordering**: aging is evaluated when a task is taken, never cached
//! - **Bounded promotion**: an aged task gains one tier, never more
//! - **Blocking consumers**: `dequeue` parks on a condvar while the queue is empty
//! - **Cooperative shutdown**: `close` releases every blocked and future dequeue
//! - **Async consumers**: `dequeue_async` with the `tokio-runtime` feature
//! - **Harness**: [`runtime::Harness`] runs producers/consumers and joins them with a timeout
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use aging_scheduler::{AgingPolicy, PriorityTier, SchedulerQueue, Task};
//!
//! let queue = Arc::new(SchedulerQueue::new(AgingPolicy::from_millis(100)));
//!
//! let consumer = {
//!     let queue = Arc::clone(&queue);
//!     thread::spawn(move || queue.dequeue().map(Task::into_payload))
//! };
//!
//! queue.enqueue(Task::new(PriorityTier::High, "rotate keys"));
//! assert_eq!(consumer.join().unwrap(), Ok("rotate keys"));
//!
//! queue.close();
//! assert!(queue.dequeue().is_err());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: tiers, tasks, ordering, queue, producers and consumers.
pub mod core;
/// Configuration models for the harness.
pub mod config;
/// Thread harness and run reporting.
pub mod runtime;
/// Shared utilities.
pub mod util;

pub use crate::core::{
    AgingPolicy, DequeueError, PriorityTier, SchedulerError, SchedulerQueue, Task,
};
