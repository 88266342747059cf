//! End-to-end harness runs
//!
//! Each run must consume exactly `total_tasks`, leave nothing in the queue and join
//! every worker cleanly.

use std::collections::HashSet;
use std::time::Duration;

use aging_scheduler::config::{HarnessConfig, TierSelection};
use aging_scheduler::core::CollectingHandler;
use aging_scheduler::runtime::Harness;
use aging_scheduler::{PriorityTier, SchedulerError};

fn run(config: HarnessConfig) -> (aging_scheduler::runtime::RunReport, CollectingHandler) {
    let handler = CollectingHandler::new();
    let report = Harness::new(config)
        .expect("valid config")
        .run_with(handler.clone())
        .expect("run completes");
    (report, handler)
}

#[test]
fn test_single_producer_single_consumer() {
    let (report, handler) = run(HarnessConfig::new()
        .with_total_tasks(20)
        .with_producer_count(1)
        .with_consumer_count(1));

    assert_eq!(report.consumed, 20);
    assert_eq!(report.produced, 20);
    assert!(report.is_clean(), "{report:?}");
    assert_eq!(handler.len(), 20);
    assert_eq!(report.queue_stats.dequeued, 20);
}

#[test]
fn test_uneven_split_across_producers() {
    let (report, handler) = run(HarnessConfig::new()
        .with_total_tasks(17)
        .with_producer_count(5)
        .with_consumer_count(2));

    assert_eq!(report.consumed, 17);
    let payloads: HashSet<_> = handler.records().into_iter().map(|r| r.payload).collect();
    assert_eq!(payloads.len(), 17);
    // 17 = 4 + 4 + 3 + 3 + 3: the first two producers take the remainder.
    let per_producer: Vec<_> = (0..5)
        .map(|id| {
            let prefix = format!("producer-{id} ");
            payloads.iter().filter(|p| p.starts_with(&prefix)).count()
        })
        .collect();
    assert_eq!(per_producer, vec![4, 4, 3, 3, 3]);
}

#[test]
fn test_more_consumers_than_tasks() {
    let (report, _) = run(HarnessConfig::new()
        .with_total_tasks(2)
        .with_producer_count(1)
        .with_consumer_count(6));

    assert_eq!(report.consumed, 2);
    assert!(report.join_failures.is_empty(), "idle consumers must be released by close");
    assert_eq!(report.leftover, 0);
}

#[test]
fn test_fixed_tier_run_never_promotes() {
    let (report, handler) = run(HarnessConfig::new()
        .with_total_tasks(25)
        .with_producer_count(2)
        .with_consumer_count(2)
        .with_tier_selection(TierSelection::Fixed(PriorityTier::Low)));

    assert_eq!(report.consumed, 25);
    assert_eq!(report.queue_stats.promoted, 0);
    assert!(handler.records().iter().all(|r| r.tier == PriorityTier::Low));
}

#[test]
fn test_slow_consumer_lets_backlog_age() {
    let handler = CollectingHandler::new().with_work(Duration::from_millis(10));
    let config = HarnessConfig::new()
        .with_total_tasks(12)
        .with_producer_count(1)
        .with_consumer_count(1)
        .with_age_threshold_ms(5)
        .with_tier_selection(TierSelection::RoundRobin);
    let report = Harness::new(config)
        .unwrap()
        .run_with(handler.clone())
        .unwrap();

    assert!(report.is_clean(), "{report:?}");
    let records = handler.records();
    assert_eq!(records.len(), 12);
    // One consumer doing 10ms of work per task: the last task waits far past 5ms.
    assert!(records.last().is_some_and(|r| r.aged));
}

#[test]
fn test_harness_from_json_config() {
    let config = HarnessConfig::from_json_str(
        r#"{ "total_tasks": 9, "producer_count": 3, "consumer_count": 3, "tier_selection": "round_robin" }"#,
    )
    .unwrap();
    let (report, _) = run(config);
    assert_eq!(report.consumed, 9);
    assert!(report.is_clean());
}

#[test]
fn test_harness_rejects_zero_producers() {
    let err = Harness::new(HarnessConfig::new().with_producer_count(0)).unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidConfiguration(_)));
}

#[test]
fn test_each_run_gets_a_fresh_id() {
    let config = HarnessConfig::new().with_total_tasks(3).with_consumer_count(1);
    let (first, _) = run(config.clone());
    let (second, _) = run(config);
    assert_ne!(first.run_id, second.run_id);
}
