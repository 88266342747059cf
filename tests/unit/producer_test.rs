//! Tests for producers and consumers driven on the calling thread

use std::time::Duration;

use aging_scheduler::config::TierSelection;
use aging_scheduler::core::{CollectingHandler, CompletionLatch, Consumer, Producer};
use aging_scheduler::util::{Clock, ManualClock};
use aging_scheduler::{AgingPolicy, PriorityTier, SchedulerQueue};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_producer_stamps_tasks_with_queue_clock() {
    let clock = ManualClock::new();
    let queue = SchedulerQueue::with_clock(AgingPolicy::default(), clock.clone());
    let stamped_at = clock.now();

    Producer::new(0, 3, TierSelection::Fixed(PriorityTier::High)).run(&queue, |i, _| i);

    for task in queue.drain() {
        assert_eq!(task.created_at(), stamped_at);
        assert_eq!(task.tier(), PriorityTier::High);
    }
}

#[test]
fn test_random_selection_covers_every_tier() {
    let producer = Producer::new(0, 300, TierSelection::Random);
    let mut rng = StdRng::seed_from_u64(7);
    let mut seen = [false; PriorityTier::COUNT];
    for i in 0..300 {
        seen[producer.tier_for(i, &mut rng).index()] = true;
    }
    assert_eq!(seen, [true; PriorityTier::COUNT]);
}

#[test]
fn test_consumer_records_promotion_and_stops_at_latch() {
    let clock = ManualClock::new();
    let queue = SchedulerQueue::with_clock(AgingPolicy::from_millis(100), clock.clone());

    Producer::new(0, 1, TierSelection::Fixed(PriorityTier::Low))
        .run(&queue, |_, _| "backlog".to_string());
    clock.advance(Duration::from_millis(150));
    Producer::new(1, 2, TierSelection::Fixed(PriorityTier::Medium))
        .run(&queue, |i, _| format!("fresh-{i}"));

    let handler = CollectingHandler::new();
    let latch = CompletionLatch::new(2);
    let handled = Consumer::new(4, handler.clone()).run(&queue, &latch);

    assert_eq!(handled, 2);
    assert!(latch.is_done());
    assert_eq!(queue.len(), 1, "consumer must stop once the latch reaches zero");

    let records = handler.records();
    assert_eq!(records[0].payload, "backlog");
    assert!(records[0].aged);
    assert_eq!(records[0].consumer_id, 4);
    assert_eq!(records[0].age, Duration::from_millis(150));
    assert_eq!(records[1].payload, "fresh-0");
    assert!(!records[1].aged);
}
