//! Integration tests for ticker acceptance testing.
//!
//! All tests run against [`ticker_runtime::clock::ManualClock`], so they are
//! deterministic and need no special privileges.

mod common;
mod scenario_test;
mod wraparound_test;
