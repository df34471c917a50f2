//! End-to-end scenario: one-shot and periodic tasks sharing a two-slot table.
//!
//! # Acceptance Criteria
//!
//! - The one-shot task fires on the first tick call at or past its expiry
//!   and its slot is freed
//! - The periodic task re-arms from the sampled time while it returns
//!   `Repeat`, and is freed by the call on which it returns `Done`
//! - Rate flags keep running alongside task dispatch
//! - A one-shot task returning `Repeat` still fires only once

use super::common::{manual_scheduler, tick_at, FiringLog};
use std::cell::Cell;
use std::rc::Rc;
use ticker_common::rate::Rate;
use ticker_runtime::task::{TaskId, TaskOutcome};

#[test]
fn test_one_shot_and_periodic_scenario() {
    let (clock, mut scheduler) = manual_scheduler::<2>(1000);
    let log = FiringLog::new();

    let a_log = log.clone();
    let a = scheduler
        .schedule_once(50, move |s| {
            a_log.record("A", s.now().0);
            TaskOutcome::Done
        })
        .unwrap();

    let b_log = log.clone();
    let b_calls = Rc::new(Cell::new(0u32));
    let b_counter = Rc::clone(&b_calls);
    let b = scheduler
        .schedule_periodic(30, move |s| {
            b_log.record("B", s.now().0);
            b_counter.set(b_counter.get() + 1);
            if b_counter.get() <= 3 {
                TaskOutcome::Repeat
            } else {
                TaskOutcome::Done
            }
        })
        .unwrap();

    assert_eq!(a, TaskId(0));
    assert_eq!(b, TaskId(1));
    assert!(scheduler.is_full());

    for at in [1010, 1040, 1060, 1090, 1120] {
        tick_at(&clock, &mut scheduler, at);
    }

    assert_eq!(log.times_of("A"), vec![1060]);
    assert_eq!(log.times_of("B"), vec![1040, 1090, 1120]);
    assert!(!scheduler.is_scheduled(a));
    assert!(scheduler.is_scheduled(b));
    assert_eq!(scheduler.task(b).unwrap().expiry.0, 1150);

    tick_at(&clock, &mut scheduler, 1150);
    assert_eq!(log.times_of("B"), vec![1040, 1090, 1120, 1150]);
    assert_eq!(b_calls.get(), 4);
    assert_eq!(scheduler.active_tasks(), 0);

    let stats = scheduler.stats();
    assert_eq!(stats.tick_calls(), 6);
    assert_eq!(stats.fired(), 5);
    assert_eq!(stats.rearmed(), 3);
    assert_eq!(stats.completed(), 2);
    assert_eq!(stats.errored(), 0);
}

#[test]
fn test_dispatch_order_follows_slots() {
    let (clock, mut scheduler) = manual_scheduler::<4>(0);
    let log = FiringLog::new();

    for label in ["first", "second", "third"] {
        let log = log.clone();
        scheduler
            .schedule_once(10, move |s| {
                log.record(label, s.now().0);
                TaskOutcome::Done
            })
            .unwrap();
    }

    tick_at(&clock, &mut scheduler, 25);
    assert_eq!(
        log.entries(),
        vec![("first", 25), ("second", 25), ("third", 25)]
    );
    assert_eq!(scheduler.stats().max_fired_per_tick(), 3);
}

#[test]
fn test_chained_one_shots() {
    let (clock, mut scheduler) = manual_scheduler::<1>(0);
    let log = FiringLog::new();

    let outer = log.clone();
    scheduler
        .schedule_once(10, move |s| {
            outer.record("outer", s.now().0);
            let inner = outer.clone();
            // The firing slot is still held, so a one-slot table is full
            assert!(s
                .schedule_once(5, move |s| {
                    inner.record("inner", s.now().0);
                    TaskOutcome::Done
                })
                .is_err());
            TaskOutcome::Done
        })
        .unwrap();

    tick_at(&clock, &mut scheduler, 10);
    assert_eq!(scheduler.active_tasks(), 0);

    let (clock, mut scheduler) = manual_scheduler::<2>(0);
    let outer = log.clone();
    scheduler
        .schedule_once(10, move |s| {
            let inner = outer.clone();
            s.schedule_once(5, move |s| {
                inner.record("inner", s.now().0);
                TaskOutcome::Done
            })
            .unwrap();
            TaskOutcome::Done
        })
        .unwrap();

    tick_at(&clock, &mut scheduler, 10);
    assert!(log.times_of("inner").is_empty());
    tick_at(&clock, &mut scheduler, 14);
    assert!(log.times_of("inner").is_empty());
    tick_at(&clock, &mut scheduler, 15);
    assert_eq!(log.times_of("inner"), vec![15]);
    assert_eq!(log.times_of("outer"), vec![10]);
}

#[test]
fn test_rate_flags_alongside_tasks() {
    let (clock, mut scheduler) = manual_scheduler::<2>(1000);
    let heartbeats = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&heartbeats);
    scheduler
        .schedule_periodic(100, move |_| {
            counter.set(counter.get() + 1);
            TaskOutcome::Repeat
        })
        .unwrap();

    let mut hz10 = 0;
    let mut hz1 = 0;
    for t in 1001..=2000 {
        tick_at(&clock, &mut scheduler, t);
        hz10 += u32::from(scheduler.fired(Rate::Hz10));
        hz1 += u32::from(scheduler.fired(Rate::Hz1));
    }

    assert_eq!(heartbeats.get(), 10);
    assert_eq!(hz10, 10);
    assert_eq!(hz1, 1);
    assert!(scheduler.fired(Rate::Hz1));
}

#[test]
fn test_periodic_fires_on_interval_multiples() {
    let (clock, mut scheduler) = manual_scheduler::<2>(250);
    let log = FiringLog::new();

    let periodic_log = log.clone();
    let id = scheduler
        .schedule_periodic(40, move |s| {
            periodic_log.record("P", s.now().0);
            if s.now().0 >= 450 {
                TaskOutcome::Done
            } else {
                TaskOutcome::Repeat
            }
        })
        .unwrap();

    let once_log = log.clone();
    scheduler
        .schedule_once(10, move |s| {
            once_log.record("O", s.now().0);
            TaskOutcome::Repeat
        })
        .unwrap();

    for t in 251..=600 {
        tick_at(&clock, &mut scheduler, t);
    }

    assert_eq!(log.times_of("P"), vec![290, 330, 370, 410, 450]);
    assert_eq!(log.times_of("O"), vec![260]);
    assert!(!scheduler.is_scheduled(id));
    assert_eq!(scheduler.active_tasks(), 0);
}
