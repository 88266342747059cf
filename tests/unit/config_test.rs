//! Tests for harness configuration validation and parsing

use aging_scheduler::config::{HarnessConfig, TierSelection};
use aging_scheduler::PriorityTier;

#[test]
fn test_harness_config_validation() {
    let valid = HarnessConfig::new()
        .with_total_tasks(10)
        .with_producer_count(2)
        .with_consumer_count(2);
    assert!(valid.validate().is_ok());
}

#[test]
fn test_harness_config_invalid_total_tasks() {
    let invalid = HarnessConfig::new().with_total_tasks(0);
    assert!(invalid.validate().unwrap_err().contains("total_tasks"));
}

#[test]
fn test_harness_config_invalid_producer_count() {
    let invalid = HarnessConfig::new().with_producer_count(0);
    assert!(invalid.validate().unwrap_err().contains("producer_count"));
}

#[test]
fn test_harness_config_invalid_consumer_count() {
    let invalid = HarnessConfig::new().with_consumer_count(0);
    assert!(invalid.validate().unwrap_err().contains("consumer_count"));
}

#[test]
fn test_harness_config_invalid_join_timeout() {
    let invalid = HarnessConfig::new().with_join_timeout_ms(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_zero_threshold_is_allowed() {
    let cfg = HarnessConfig::new().with_age_threshold_ms(0);
    assert!(cfg.validate().is_ok());
    assert!(cfg.aging_policy().threshold().is_zero());
}

#[test]
fn test_harness_config_from_json() {
    let cfg = HarnessConfig::from_json_str(
        r#"{
            "total_tasks": 12,
            "producer_count": 3,
            "consumer_count": 2,
            "age_threshold_ms": 250,
            "tier_selection": { "fixed": "low" }
        }"#,
    )
    .unwrap();

    assert_eq!(cfg.total_tasks, 12);
    assert_eq!(cfg.producer_count, 3);
    assert_eq!(cfg.aging_policy().threshold().as_millis(), 250);
    assert_eq!(cfg.tier_selection, TierSelection::Fixed(PriorityTier::Low));
    // Unspecified fields keep their defaults.
    assert_eq!(cfg.join_timeout_ms, HarnessConfig::default().join_timeout_ms);
}

#[test]
fn test_harness_config_from_json_rejects_invalid() {
    assert!(HarnessConfig::from_json_str("{ not json").is_err());
    assert!(HarnessConfig::from_json_str(r#"{ "consumer_count": 0 }"#).is_err());
    assert!(HarnessConfig::from_json_str(r#"{ "tier_selection": { "fixed": "urgent" } }"#).is_err());
}

#[test]
fn test_harness_config_serde_round_trip() {
    let cfg = HarnessConfig::new()
        .with_total_tasks(7)
        .with_tier_selection(TierSelection::RoundRobin);
    let json = serde_json::to_string(&cfg).unwrap();
    assert!(json.contains("\"round_robin\""));
    assert_eq!(HarnessConfig::from_json_str(&json).unwrap(), cfg);
}
