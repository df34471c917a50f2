//! Common utilities for acceptance tests.
//!
//! Provides helpers for:
//! - Building schedulers on a simulated clock
//! - Recording callback firings
//! - Deterministic pseudo-random call spacing

#![allow(dead_code)] // Not every helper is used by every test file

use std::cell::RefCell;
use std::rc::Rc;
use ticker_runtime::clock::ManualClock;
use ticker_runtime::scheduler::Scheduler;

/// Scheduler on a manual clock, plus a handle to drive that clock.
pub fn manual_scheduler<const N: usize>(start: u32) -> (ManualClock, Scheduler<ManualClock, N>) {
    let clock = ManualClock::new(start);
    let scheduler = Scheduler::new(clock.clone());
    (clock, scheduler)
}

/// Set the clock to `at` and run one tick call.
pub fn tick_at<const N: usize>(clock: &ManualClock, scheduler: &mut Scheduler<ManualClock, N>, at: u32) {
    clock.set(at);
    scheduler.tick();
}

/// Shared log of `(label, sampled time)` pairs written by callbacks.
#[derive(Debug, Clone, Default)]
pub struct FiringLog {
    entries: Rc<RefCell<Vec<(&'static str, u32)>>>,
}

impl FiringLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, label: &'static str, at: u32) {
        self.entries.borrow_mut().push((label, at));
    }

    pub fn entries(&self) -> Vec<(&'static str, u32)> {
        self.entries.borrow().clone()
    }

    /// Sampled times at which `label` fired, in order.
    pub fn times_of(&self, label: &str) -> Vec<u32> {
        self.entries
            .borrow()
            .iter()
            .filter(|(l, _)| *l == label)
            .map(|(_, t)| *t)
            .collect()
    }
}

/// Deterministic XorShift64 generator for call spacing.
///
/// Seed 0 is mapped to a non-zero value to avoid the all-zero lockup state.
#[derive(Clone, Debug)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    pub fn new(seed: u64) -> Self {
        let seed = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform-enough value in `0..=max`.
    pub fn next_inclusive(&mut self, max: u32) -> u32 {
        (self.next_u64() % (u64::from(max) + 1)) as u32
    }
}
