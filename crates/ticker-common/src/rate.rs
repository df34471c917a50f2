//! The fixed set of tick-flag frequencies.
//!
//! Ten rates from 1 Hz to 1000 Hz, each with an integral millisecond period.
//! [`RateSet`] is a set of rate flags used to report which rates fired on a
//! given tick call.

use crate::error::TickerError;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported tick-flag frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rate {
    /// 1 Hz (1000 ms period).
    #[serde(rename = "1hz")]
    Hz1,
    /// 2 Hz (500 ms period).
    #[serde(rename = "2hz")]
    Hz2,
    /// 5 Hz (200 ms period).
    #[serde(rename = "5hz")]
    Hz5,
    /// 10 Hz (100 ms period).
    #[serde(rename = "10hz")]
    Hz10,
    /// 20 Hz (50 ms period).
    #[serde(rename = "20hz")]
    Hz20,
    /// 50 Hz (20 ms period).
    #[serde(rename = "50hz")]
    Hz50,
    /// 100 Hz (10 ms period).
    #[serde(rename = "100hz")]
    Hz100,
    /// 200 Hz (5 ms period).
    #[serde(rename = "200hz")]
    Hz200,
    /// 500 Hz (2 ms period).
    #[serde(rename = "500hz")]
    Hz500,
    /// 1000 Hz (1 ms period).
    #[serde(rename = "1000hz")]
    Hz1000,
}

impl Rate {
    /// Number of supported rates.
    pub const COUNT: usize = 10;

    /// All rates, lowest frequency first.
    pub const ALL: [Rate; Rate::COUNT] = [
        Rate::Hz1,
        Rate::Hz2,
        Rate::Hz5,
        Rate::Hz10,
        Rate::Hz20,
        Rate::Hz50,
        Rate::Hz100,
        Rate::Hz200,
        Rate::Hz500,
        Rate::Hz1000,
    ];

    /// Frequency in hertz.
    #[must_use]
    pub const fn hz(self) -> u32 {
        match self {
            Rate::Hz1 => 1,
            Rate::Hz2 => 2,
            Rate::Hz5 => 5,
            Rate::Hz10 => 10,
            Rate::Hz20 => 20,
            Rate::Hz50 => 50,
            Rate::Hz100 => 100,
            Rate::Hz200 => 200,
            Rate::Hz500 => 500,
            Rate::Hz1000 => 1000,
        }
    }

    /// Period in milliseconds (`1000 / hz`).
    #[must_use]
    pub const fn period_ms(self) -> u32 {
        1000 / self.hz()
    }

    /// Position of this rate in [`Rate::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a rate by its frequency.
    #[must_use]
    pub fn from_hz(hz: u32) -> Option<Rate> {
        Rate::ALL.into_iter().find(|rate| rate.hz() == hz)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Hz", self.hz())
    }
}

impl FromStr for Rate {
    type Err = TickerError;

    /// Accepts `"5"`, `"5hz"` or `"5Hz"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_suffix("hz")
            .or_else(|| trimmed.strip_suffix("Hz"))
            .or_else(|| trimmed.strip_suffix("HZ"))
            .unwrap_or(trimmed)
            .trim_end();

        digits
            .parse::<u32>()
            .ok()
            .and_then(Rate::from_hz)
            .ok_or_else(|| TickerError::InvalidRate(s.to_string()))
    }
}

bitflags! {
    /// A set of rates, one flag per rate.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RateSet: u16 {
        /// 1 Hz
        const HZ1 = 1 << 0;
        /// 2 Hz
        const HZ2 = 1 << 1;
        /// 5 Hz
        const HZ5 = 1 << 2;
        /// 10 Hz
        const HZ10 = 1 << 3;
        /// 20 Hz
        const HZ20 = 1 << 4;
        /// 50 Hz
        const HZ50 = 1 << 5;
        /// 100 Hz
        const HZ100 = 1 << 6;
        /// 200 Hz
        const HZ200 = 1 << 7;
        /// 500 Hz
        const HZ500 = 1 << 8;
        /// 1000 Hz
        const HZ1000 = 1 << 9;
    }
}

static_assertions::const_assert_eq!(RateSet::all().bits().count_ones() as usize, Rate::COUNT);

impl Rate {
    /// The flag standing for this rate in a [`RateSet`].
    #[must_use]
    pub const fn flag(self) -> RateSet {
        match self {
            Rate::Hz1 => RateSet::HZ1,
            Rate::Hz2 => RateSet::HZ2,
            Rate::Hz5 => RateSet::HZ5,
            Rate::Hz10 => RateSet::HZ10,
            Rate::Hz20 => RateSet::HZ20,
            Rate::Hz50 => RateSet::HZ50,
            Rate::Hz100 => RateSet::HZ100,
            Rate::Hz200 => RateSet::HZ200,
            Rate::Hz500 => RateSet::HZ500,
            Rate::Hz1000 => RateSet::HZ1000,
        }
    }

    /// The rate a single flag stands for.
    #[must_use]
    pub fn from_flag(flag: RateSet) -> Option<Rate> {
        Rate::ALL.into_iter().find(|rate| rate.flag() == flag)
    }
}

impl RateSet {
    /// Whether the set contains `rate`.
    #[must_use]
    pub fn contains_rate(self, rate: Rate) -> bool {
        self.contains(rate.flag())
    }

    /// The rates present, lowest frequency first.
    pub fn rates(self) -> impl Iterator<Item = Rate> {
        self.iter().filter_map(Rate::from_flag)
    }
}

impl From<Rate> for RateSet {
    fn from(rate: Rate) -> Self {
        rate.flag()
    }
}

impl FromIterator<Rate> for RateSet {
    fn from_iter<I: IntoIterator<Item = Rate>>(iter: I) -> Self {
        iter.into_iter().map(Rate::flag).collect()
    }
}

impl fmt::Display for RateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, rate) in self.rates().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{rate}")?;
        }
        write!(f, "}}")
    }
}
