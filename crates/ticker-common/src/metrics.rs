//! Dispatch statistics for the task table.
//!
//! Plain counters updated in place by the scheduler; no allocation on the
//! tick path.

use serde::Serialize;

/// Counters describing what the scheduler has done since creation or the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    /// Total tick calls.
    tick_calls: u64,
    /// Callbacks invoked.
    fired: u64,
    /// Periodic tasks re-armed after returning REPEAT.
    rearmed: u64,
    /// Tasks freed after firing (DONE, ERROR, or one-shot).
    completed: u64,
    /// Callbacks that returned ERROR.
    errored: u64,
    /// Tasks removed through explicit cancellation.
    cancelled: u64,
    /// Scheduling requests that were refused.
    schedule_failures: u64,
    /// Most callbacks fired within a single tick call.
    max_fired_per_tick: u32,
}

impl DispatchStats {
    /// Create zeroed statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the end of a tick call that fired `fired` callbacks.
    pub fn record_tick(&mut self, fired: u32) {
        self.tick_calls += 1;
        self.max_fired_per_tick = self.max_fired_per_tick.max(fired);
    }

    /// Record one callback invocation.
    pub fn record_fired(&mut self) {
        self.fired += 1;
    }

    /// Record a periodic task being re-armed.
    pub fn record_rearm(&mut self) {
        self.rearmed += 1;
    }

    /// Record a task being freed after firing.
    pub fn record_completion(&mut self, errored: bool) {
        self.completed += 1;
        if errored {
            self.errored += 1;
        }
    }

    /// Record an explicit cancellation.
    pub fn record_cancel(&mut self) {
        self.cancelled += 1;
    }

    /// Record a refused scheduling request.
    pub fn record_schedule_failure(&mut self) {
        self.schedule_failures += 1;
    }

    /// Total tick calls.
    #[must_use]
    pub fn tick_calls(&self) -> u64 {
        self.tick_calls
    }

    /// Callbacks invoked.
    #[must_use]
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Periodic re-arms.
    #[must_use]
    pub fn rearmed(&self) -> u64 {
        self.rearmed
    }

    /// Tasks freed after firing.
    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Callbacks that reported ERROR.
    #[must_use]
    pub fn errored(&self) -> u64 {
        self.errored
    }

    /// Explicit cancellations.
    #[must_use]
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }

    /// Refused scheduling requests.
    #[must_use]
    pub fn schedule_failures(&self) -> u64 {
        self.schedule_failures
    }

    /// Most callbacks fired within a single tick call.
    #[must_use]
    pub fn max_fired_per_tick(&self) -> u32 {
        self.max_fired_per_tick
    }

    /// Reset all counters to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
