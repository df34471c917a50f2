//! Blocking busy-wait delay.
//!
//! This is not part of the cooperative scheduler: it spins on the time
//! source and never returns control to the main loop, so no tasks are
//! dispatched and no rate flags are updated until it finishes. Do not call
//! it from a task callback if other tasks need to make progress.

use crate::clock::TimeSource;
use ticker_common::time::{elapsed, ms_to_ticks};

/// Spin until `duration_ms` milliseconds have elapsed on `clock`.
///
/// `on_idle`, if given, runs on every poll of the clock (typically a
/// watchdog kick). Correct across counter wraparound.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use ticker_runtime::delay::delay_ms;
///
/// // A counter that advances one tick per read
/// let counter = Cell::new(u32::MAX - 2);
/// let clock = || {
///     let value = counter.get();
///     counter.set(value.wrapping_add(1));
///     value
/// };
///
/// let mut kicks = 0;
/// delay_ms(&clock, 5, 1, Some(&mut || kicks += 1));
/// assert_eq!(kicks, 4);
/// ```
pub fn delay_ms<C>(clock: &C, duration_ms: u32, ticks_per_ms: u32, mut on_idle: Option<&mut dyn FnMut()>)
where
    C: TimeSource + ?Sized,
{
    let start = clock.now();
    let target = ms_to_ticks(duration_ms, ticks_per_ms);

    while elapsed(clock.now(), start) < target {
        if let Some(idle) = on_idle.as_deref_mut() {
            idle();
        }
    }
}
