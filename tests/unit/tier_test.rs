//! Tests for priority tiers and the aging policy

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use aging_scheduler::{AgingPolicy, PriorityTier, SchedulerError, Task};

#[test]
fn test_tier_order_is_high_medium_low() {
    assert_eq!(
        PriorityTier::ALL,
        [PriorityTier::High, PriorityTier::Medium, PriorityTier::Low]
    );
    assert!(PriorityTier::High.rank() < PriorityTier::Low.rank());
}

#[test]
fn test_tier_parse_and_display() {
    for tier in PriorityTier::ALL {
        assert_eq!(tier.to_string().parse::<PriorityTier>().unwrap(), tier);
    }
    assert_eq!(" LOW ".parse::<PriorityTier>().unwrap(), PriorityTier::Low);
    assert!(matches!(
        "urgent".parse::<PriorityTier>(),
        Err(SchedulerError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_tier_serializes_snake_case() {
    assert_eq!(serde_json::to_string(&PriorityTier::Medium).unwrap(), "\"medium\"");
}

#[test]
fn test_policy_compares_at_the_given_instant() {
    let policy = AgingPolicy::from_millis(100);
    let t0 = Instant::now();
    let low = Task::with_created_at(PriorityTier::Low, (), t0);
    let medium = Task::with_created_at(PriorityTier::Medium, (), t0 + Duration::from_millis(50));

    let early = t0 + Duration::from_millis(60);
    assert_eq!(policy.compare(&medium, &low, early), Ordering::Less);

    let late = t0 + Duration::from_millis(101);
    assert_eq!(policy.compare(&low, &medium, late), Ordering::Less);
    assert_eq!(policy.effective_rank(&low, late), PriorityTier::Medium.rank());
}

#[test]
fn test_policy_default_threshold() {
    assert_eq!(AgingPolicy::default().threshold(), Duration::from_millis(100));
}
