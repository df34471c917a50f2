//! Behaviour across the 32-bit counter wraparound.
//!
//! # Acceptance Criteria
//!
//! - Expiry checks around 2^32 decide exactly as with unbounded time
//! - Rate flags keep their cadence through the wrap
//! - Remaining-time queries stay correct when the expiry has wrapped

use super::common::{manual_scheduler, tick_at, FiringLog, XorShift64};
use std::cell::Cell;
use std::rc::Rc;
use ticker_common::rate::Rate;
use ticker_runtime::task::TaskOutcome;

/// Periodic task in an unbounded-time model.
struct ModelTask {
    label: &'static str,
    interval: u64,
    expiry: u64,
}

#[test]
fn test_expiry_across_wrap_boundary() {
    let (clock, mut scheduler) = manual_scheduler::<2>(0xFFFF_FFFE);
    let fired = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&fired);
    let id = scheduler
        .schedule_once(3, move |_| {
            counter.set(counter.get() + 1);
            TaskOutcome::Done
        })
        .unwrap();

    assert_eq!(scheduler.task(id).unwrap().expiry.0, 1);
    assert_eq!(scheduler.remaining(id), Some(3));

    tick_at(&clock, &mut scheduler, 0xFFFF_FFFF);
    assert_eq!(fired.get(), 0);
    assert_eq!(scheduler.remaining(id), Some(2));

    tick_at(&clock, &mut scheduler, 0);
    assert_eq!(fired.get(), 0);

    tick_at(&clock, &mut scheduler, 2);
    assert_eq!(fired.get(), 1);
    assert!(!scheduler.is_scheduled(id));
}

#[test]
fn test_matches_unbounded_simulation() {
    const START: u32 = 0xFFFF_F000;
    let (clock, mut scheduler) = manual_scheduler::<4>(START);
    let log = FiringLog::new();

    let mut model: Vec<ModelTask> = Vec::new();
    for (label, interval) in [("a", 7u32), ("b", 50), ("c", 333), ("d", 1000)] {
        let log = log.clone();
        scheduler
            .schedule_periodic(interval, move |s| {
                log.record(label, s.now().0);
                TaskOutcome::Repeat
            })
            .unwrap();
        model.push(ModelTask {
            label,
            interval: u64::from(interval),
            expiry: u64::from(START) + u64::from(interval),
        });
    }

    let mut rng = XorShift64::new(0x5EED_0001);
    let mut unbounded = u64::from(START);
    let mut expected: Vec<(&'static str, u32)> = Vec::new();

    // Well past the wrap point
    while unbounded < u64::from(START) + 20_000 {
        unbounded += u64::from(rng.next_inclusive(12));
        let raw = unbounded as u32;
        tick_at(&clock, &mut scheduler, raw);

        for task in &mut model {
            if unbounded >= task.expiry {
                expected.push((task.label, raw));
                task.expiry = unbounded + task.interval;
            }
        }
    }

    assert!(unbounded > u64::from(u32::MAX));
    assert_eq!(log.entries(), expected);
    assert!(log.times_of("d").len() >= 19);
}

#[test]
fn test_rate_cadence_through_wrap() {
    let (clock, mut scheduler) = manual_scheduler::<1>(u32::MAX - 499);
    let mut counts = [0u32; Rate::COUNT];

    for step in 1..=2000u32 {
        tick_at(&clock, &mut scheduler, (u32::MAX - 499).wrapping_add(step));
        for rate in scheduler.fired_rates().rates() {
            counts[rate.index()] += 1;
        }
    }

    for rate in Rate::ALL {
        assert_eq!(counts[rate.index()], 2000 / rate.period_ms(), "{rate}");
    }
}
