//! Wraparound-safe tick arithmetic.
//!
//! The tick counter is a free-running 32-bit value that wraps at 2^32.
//! All "has X passed since Y" checks go through modular subtraction, which
//! stays correct across the wrap as long as no single interval exceeds
//! [`MAX_INTERVAL_TICKS`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest interval, in ticks, that still compares correctly across wraparound.
pub const MAX_INTERVAL_TICKS: u32 = i32::MAX as u32;

/// A sampled value of the 32-bit monotonic tick counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tick(pub u32);

impl Tick {
    /// Tick zero.
    pub const ZERO: Tick = Tick(0);

    /// Ticks elapsed from `earlier` to `self`, modulo 2^32.
    #[inline]
    #[must_use]
    pub const fn elapsed_since(self, earlier: Tick) -> u32 {
        elapsed(self.0, earlier.0)
    }

    /// Whether `self` is at or past `deadline`.
    ///
    /// Treats the deadline as reached when the modular distance from it is
    /// less than half the counter range, so `0x0000_0002` has reached
    /// `0xFFFF_FFFE`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn has_reached(self, deadline: Tick) -> bool {
        (self.0.wrapping_sub(deadline.0) as i32) >= 0
    }

    /// The tick `ticks` after `self`, wrapping at 2^32.
    #[inline]
    #[must_use]
    pub const fn offset(self, ticks: u32) -> Tick {
        Tick(self.0.wrapping_add(ticks))
    }

    /// Ticks remaining until `deadline`, or 0 once it has been reached.
    #[inline]
    #[must_use]
    pub const fn until(self, deadline: Tick) -> u32 {
        if self.has_reached(deadline) {
            0
        } else {
            deadline.0.wrapping_sub(self.0)
        }
    }
}

impl From<u32> for Tick {
    fn from(raw: u32) -> Self {
        Tick(raw)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `(a - b) mod 2^32`, interpreted as a non-negative duration.
#[inline]
#[must_use]
pub const fn elapsed(a: u32, b: u32) -> u32 {
    a.wrapping_sub(b)
}

/// Convert milliseconds to ticks using the platform's tick-to-millisecond ratio.
///
/// Wraps like the counter itself; callers keep intervals under
/// [`MAX_INTERVAL_TICKS`].
#[inline]
#[must_use]
pub const fn ms_to_ticks(ms: u32, ticks_per_ms: u32) -> u32 {
    ms.wrapping_mul(ticks_per_ms)
}

/// Like [`ms_to_ticks`], but `None` past [`MAX_INTERVAL_TICKS`].
#[inline]
#[must_use]
pub const fn checked_ms_to_ticks(ms: u32, ticks_per_ms: u32) -> Option<u32> {
    match ms.checked_mul(ticks_per_ms) {
        Some(ticks) if ticks <= MAX_INTERVAL_TICKS => Some(ticks),
        _ => None,
    }
}
