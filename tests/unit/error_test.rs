//! Tests for error types

use aging_scheduler::{DequeueError, SchedulerError};

#[test]
fn test_scheduler_error_display() {
    let err = SchedulerError::InvalidConfiguration("total_tasks must be greater than 0".into());
    assert_eq!(
        err.to_string(),
        "invalid configuration: total_tasks must be greater than 0"
    );

    let err = SchedulerError::Spawn("consumer 2: out of threads".into());
    assert!(err.to_string().contains("consumer 2"));
}

#[test]
fn test_dequeue_error_display() {
    assert_eq!(DequeueError::Closed.to_string(), "queue closed");
    assert_eq!(DequeueError::TimedOut.to_string(), "dequeue timed out");
}

#[test]
fn test_errors_convert_into_anyhow() {
    fn fails() -> aging_scheduler::core::AppResult<()> {
        Err(DequeueError::Closed)?;
        Ok(())
    }
    let err = fails().unwrap_err();
    assert_eq!(err.downcast_ref::<DequeueError>(), Some(&DequeueError::Closed));
}
