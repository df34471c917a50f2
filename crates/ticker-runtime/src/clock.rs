//! Time sources for the scheduler.
//!
//! The scheduler only needs "the current value of a free-running 32-bit
//! tick counter". [`TimeSource`] is that boundary; everything platform
//! specific lives behind it.
//!
//! - [`ManualClock`]: caller-driven counter for simulation and tests
//! - [`MonotonicClock`]: host clock backed by [`std::time::Instant`]
//! - any `Fn() -> u32` closure, e.g. a wrapper around a hardware timer register

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic tick counter, non-decreasing except for wraparound at 2^32.
pub trait TimeSource {
    /// Current raw counter value.
    fn now(&self) -> u32;
}

impl<F> TimeSource for F
where
    F: Fn() -> u32,
{
    fn now(&self) -> u32 {
        self()
    }
}

/// Counter that only moves when told to.
///
/// Clones share the same counter, so a test can keep one handle while the
/// scheduler owns another.
///
/// # Example
///
/// ```
/// use ticker_runtime::clock::{ManualClock, TimeSource};
///
/// let clock = ManualClock::new(u32::MAX);
/// let handle = clock.clone();
/// handle.advance(3);
/// assert_eq!(clock.now(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    ticks: Rc<Cell<u32>>,
}

impl ManualClock {
    /// Create a clock reading `start`.
    #[must_use]
    pub fn new(start: u32) -> Self {
        Self {
            ticks: Rc::new(Cell::new(start)),
        }
    }

    /// Jump to an absolute counter value.
    pub fn set(&self, ticks: u32) {
        self.ticks.set(ticks);
    }

    /// Move forward by `ticks`, wrapping at 2^32.
    pub fn advance(&self, ticks: u32) {
        self.ticks.set(self.ticks.get().wrapping_add(ticks));
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> u32 {
        self.ticks.get()
    }
}

/// Host monotonic clock truncated to a 32-bit tick counter.
///
/// Counts `ticks_per_ms` ticks per millisecond since construction and wraps
/// like a hardware counter.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
    ticks_per_ms: u32,
}

impl MonotonicClock {
    /// Millisecond-resolution clock starting at zero now.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ticks_per_ms(1)
    }

    /// Clock producing `ticks_per_ms` ticks per millisecond.
    ///
    /// A ratio of zero is treated as one.
    #[must_use]
    pub fn with_ticks_per_ms(ticks_per_ms: u32) -> Self {
        Self {
            origin: Instant::now(),
            ticks_per_ms: ticks_per_ms.max(1),
        }
    }

    /// Ticks per millisecond produced by this clock.
    #[must_use]
    pub fn ticks_per_ms(&self) -> u32 {
        self.ticks_per_ms
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    #[allow(clippy::cast_possible_truncation)]
    fn now(&self) -> u32 {
        let micros = self.origin.elapsed().as_micros();
        // Truncation to 32 bits is the wraparound.
        (micros * u128::from(self.ticks_per_ms) / 1000) as u32
    }
}
