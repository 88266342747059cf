//! Unit tests for individual components

mod config_test;
mod error_test;
mod producer_test;
mod tier_test;
