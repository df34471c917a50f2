//! Drift-free multi-rate flag generator.
//!
//! Each of the ten rates keeps its own phase accumulator (`last_fire`).
//! On every update a rate's flag is raised when one full period has elapsed
//! since that accumulator, and the accumulator advances by exactly one
//! period rather than snapping to `now`. Late updates therefore fire
//! immediately without skewing the long-run phase, but a rate never pulses
//! more than once per update.

use ticker_common::rate::{Rate, RateSet};
use ticker_common::time::{ms_to_ticks, Tick};

/// Phase accumulators and current pulses for all rates.
#[derive(Debug, Clone)]
pub struct RateFlags {
    last_fire: [Tick; Rate::COUNT],
    fired: RateSet,
}

impl RateFlags {
    /// Start every period at `now`, with no flags raised.
    #[must_use]
    pub fn new(now: Tick) -> Self {
        Self {
            last_fire: [now; Rate::COUNT],
            fired: RateSet::empty(),
        }
    }

    /// Re-phase every rate to `now` and clear all flags.
    pub fn reset(&mut self, now: Tick) {
        self.last_fire = [now; Rate::COUNT];
        self.fired = RateSet::empty();
    }

    /// Recompute the flags for `now`, returning the rates that fired.
    ///
    /// All previous flags are cleared first, so each flag is a pulse lasting
    /// exactly one update.
    pub fn update(&mut self, now: Tick, ticks_per_ms: u32) -> RateSet {
        self.fired = RateSet::empty();

        for rate in Rate::ALL.into_iter().rev() {
            let period = ms_to_ticks(rate.period_ms(), ticks_per_ms);
            let last = &mut self.last_fire[rate.index()];
            if now.elapsed_since(*last) >= period {
                self.fired.insert(rate.flag());
                *last = last.offset(period);
            }
        }

        self.fired
    }

    /// Whether `rate` fired on the latest update.
    #[must_use]
    pub fn fired(&self, rate: Rate) -> bool {
        self.fired.contains_rate(rate)
    }

    /// All rates that fired on the latest update.
    #[must_use]
    pub fn fired_rates(&self) -> RateSet {
        self.fired
    }

    /// Phase accumulator of `rate`: the nominal tick of its latest pulse.
    #[must_use]
    pub fn last_fire(&self, rate: Rate) -> Tick {
        self.last_fire[rate.index()]
    }
}
