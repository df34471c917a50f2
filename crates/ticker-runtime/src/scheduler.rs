//! Cooperative scheduler for the main loop.
//!
//! One call to [`Scheduler::tick`] per main-loop iteration:
//! 1. Sample the time source
//! 2. Dispatch every task whose expiry has been reached, in slot order
//! 3. Recompute the ten rate flags
//!
//! Callbacks run to completion on the caller's stack. A callback receives
//! the scheduler itself and may schedule or cancel tasks; tasks armed while
//! a dispatch pass is running are not eligible until the next tick call.

use crate::clock::TimeSource;
use crate::delay;
use crate::rate_flags::RateFlags;
use crate::task::{Slot, Task, TaskFlags, TaskFn, TaskId, TaskInfo, TaskOutcome};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use ticker_common::error::{ScheduleError, TickerError, TickerResult};
use ticker_common::metrics::DispatchStats;
use ticker_common::rate::{Rate, RateSet};
use ticker_common::time::{checked_ms_to_ticks, ms_to_ticks, Tick, MAX_INTERVAL_TICKS};
use tracing::{debug, info, trace, warn};

/// Task table capacity used when none is given.
pub const DEFAULT_CAPACITY: usize = 8;

/// Cooperative task scheduler and rate-flag generator.
///
/// `N` is the fixed capacity of the task table.
///
/// # Example
///
/// ```
/// use ticker_runtime::clock::ManualClock;
/// use ticker_runtime::scheduler::Scheduler;
/// use ticker_runtime::task::TaskOutcome;
/// use ticker_common::rate::Rate;
///
/// let clock = ManualClock::new(0);
/// let mut scheduler: Scheduler<_> = Scheduler::new(clock.clone());
///
/// scheduler
///     .schedule_periodic(100, |_| TaskOutcome::Repeat)
///     .unwrap();
///
/// clock.advance(200);
/// scheduler.tick();
/// assert!(scheduler.fired(Rate::Hz5));
/// assert_eq!(scheduler.stats().fired(), 1);
/// ```
pub struct Scheduler<C, const N: usize = DEFAULT_CAPACITY> {
    /// External monotonic counter.
    clock: C,
    /// Counter ticks per millisecond.
    ticks_per_ms: u32,
    /// Time sampled by the latest tick call or initialization.
    now: Tick,
    /// Rate phase accumulators and pulses.
    rates: RateFlags,
    /// Fixed-capacity task table.
    slots: [Slot<C, N>; N],
    /// Dispatch pass counter, advanced once per tick call.
    pass: u64,
    /// Set while callbacks are being dispatched.
    dispatching: bool,
    /// Dispatch statistics.
    stats: DispatchStats,
}

impl<C: TimeSource, const N: usize> Scheduler<C, N> {
    const NONZERO_CAPACITY: () = assert!(N > 0, "task table capacity must be non-zero");

    /// Create a scheduler reading `clock` at one tick per millisecond.
    ///
    /// The scheduler is initialized immediately: every rate period starts now.
    pub fn new(clock: C) -> Self {
        Self::with_ticks_per_ms(clock, 1)
    }

    fn with_ticks_per_ms(clock: C, ticks_per_ms: u32) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NONZERO_CAPACITY;

        let now = Tick(clock.now());
        Self {
            clock,
            ticks_per_ms,
            now,
            rates: RateFlags::new(now),
            slots: std::array::from_fn(|_| Slot::Free),
            pass: 0,
            dispatching: false,
            stats: DispatchStats::new(),
        }
    }

    /// Start building a scheduler with non-default settings.
    pub fn builder(clock: C) -> SchedulerBuilder<C, N> {
        SchedulerBuilder::new(clock)
    }

    /// Sample the clock and start every rate period at that instant.
    ///
    /// Leaves the task table untouched.
    pub fn initialize(&mut self) {
        self.now = self.read_now();
        self.rates.reset(self.now);
        info!(now = %self.now, ticks_per_ms = self.ticks_per_ms, capacity = N, "Scheduler initialized");
    }

    /// Read the time source without updating the scheduler.
    pub fn read_now(&self) -> Tick {
        Tick(self.clock.now())
    }

    /// Time sampled by the latest tick call or initialization.
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Counter ticks per millisecond.
    pub fn ticks_per_ms(&self) -> u32 {
        self.ticks_per_ms
    }

    /// Fixed capacity of the task table.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of occupied slots.
    pub fn active_tasks(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_free()).count()
    }

    /// Whether every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|slot| !slot.is_free())
    }

    /// Dispatch statistics.
    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    /// Schedule `callback` to run `interval_ms` after the last sampled time.
    ///
    /// The expiry is computed from [`Scheduler::now`], not a fresh clock
    /// read. The lowest-index free slot is used.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::IntervalTooLong`] when `interval_ms` spans
    /// more than [`MAX_INTERVAL_TICKS`] ticks and [`ScheduleError::TableFull`]
    /// when no slot is free; the table is left unchanged.
    pub fn schedule_task<F>(
        &mut self,
        interval_ms: u32,
        flags: TaskFlags,
        callback: F,
    ) -> Result<TaskId, ScheduleError>
    where
        F: FnMut(&mut Self) -> TaskOutcome + 'static,
    {
        self.schedule_boxed(interval_ms, flags, Some(Box::new(callback)))
    }

    /// Schedule a task that fires once.
    ///
    /// # Errors
    ///
    /// See [`Scheduler::schedule_task`].
    pub fn schedule_once<F>(&mut self, interval_ms: u32, callback: F) -> Result<TaskId, ScheduleError>
    where
        F: FnMut(&mut Self) -> TaskOutcome + 'static,
    {
        self.schedule_task(interval_ms, TaskFlags::ONE_SHOT, callback)
    }

    /// Schedule a task that re-arms every `interval_ms` while it returns
    /// [`TaskOutcome::Repeat`].
    ///
    /// # Errors
    ///
    /// See [`Scheduler::schedule_task`].
    pub fn schedule_periodic<F>(
        &mut self,
        interval_ms: u32,
        callback: F,
    ) -> Result<TaskId, ScheduleError>
    where
        F: FnMut(&mut Self) -> TaskOutcome + 'static,
    {
        self.schedule_task(interval_ms, TaskFlags::PERIODIC, callback)
    }

    /// Schedule an already boxed, possibly absent, callback.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::MissingCallback`] when `callback` is `None`,
    /// whatever the table occupancy, [`ScheduleError::IntervalTooLong`] for
    /// an interval past the wraparound horizon, and
    /// [`ScheduleError::TableFull`] when no slot is free. None of them
    /// mutates the table.
    pub fn schedule_boxed(
        &mut self,
        interval_ms: u32,
        flags: TaskFlags,
        callback: Option<TaskFn<C, N>>,
    ) -> Result<TaskId, ScheduleError> {
        let Some(callback) = callback else {
            self.stats.record_schedule_failure();
            debug!(interval_ms, "Rejected task without a callback");
            return Err(ScheduleError::MissingCallback);
        };

        let Some(ticks) = checked_ms_to_ticks(interval_ms, self.ticks_per_ms) else {
            self.stats.record_schedule_failure();
            let max_ms = MAX_INTERVAL_TICKS / self.ticks_per_ms;
            debug!(interval_ms, max_ms, "Rejected task: interval past wraparound horizon");
            return Err(ScheduleError::IntervalTooLong {
                interval_ms,
                max_ms,
            });
        };

        let Some(index) = self.slots.iter().position(Slot::is_free) else {
            self.stats.record_schedule_failure();
            debug!(interval_ms, capacity = N, "Rejected task: table full");
            return Err(ScheduleError::TableFull { capacity: N });
        };

        let id = TaskId(index);
        let expiry = self.now.offset(ticks);
        self.slots[index] = Slot::Armed(Task {
            info: TaskInfo {
                id,
                flags,
                interval_ms,
                expiry,
            },
            armed_pass: self.pass,
            callback,
        });

        debug!(
            task = %id,
            interval_ms,
            periodic = flags.is_periodic(),
            %expiry,
            "Task scheduled"
        );
        Ok(id)
    }

    /// Free the slot held by `id`.
    ///
    /// Returns `false` if the slot was already free. Cancelling the task
    /// whose callback is running frees its slot once the callback returns,
    /// whatever it returns.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let Some(slot) = self.slots.get_mut(id.index()) else {
            return false;
        };
        if slot.is_free() {
            return false;
        }

        *slot = Slot::Free;
        self.stats.record_cancel();
        debug!(task = %id, "Task cancelled");
        true
    }

    /// Whether `id` refers to an occupied slot.
    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.slots.get(id.index()).is_some_and(|slot| !slot.is_free())
    }

    /// Scheduling metadata of the task in `id`'s slot.
    pub fn task(&self, id: TaskId) -> Option<TaskInfo> {
        self.slots.get(id.index()).and_then(Slot::info).copied()
    }

    /// Ticks from the last sampled time until `id` becomes eligible, 0 if due.
    pub fn remaining(&self, id: TaskId) -> Option<u32> {
        self.task(id).map(|info| self.now.until(info.expiry))
    }

    /// Run one tick call: sample time, dispatch expired tasks, update rate flags.
    ///
    /// Calling `tick` from inside a task callback is ignored.
    ///
    /// A panic in a callback propagates to the caller after the panicking
    /// task's slot has been freed; later tick calls dispatch normally.
    pub fn tick(&mut self) {
        if self.dispatching {
            warn!("tick() called from inside a task callback; ignored");
            return;
        }

        self.now = self.read_now();
        self.pass = self.pass.wrapping_add(1);

        self.dispatching = true;
        let mut fired = 0u32;
        for index in 0..N {
            if self.dispatch_slot(index) {
                fired += 1;
            }
        }
        self.dispatching = false;
        self.stats.record_tick(fired);

        let pulses = self.rates.update(self.now, self.ticks_per_ms);

        trace!(now = %self.now, fired, rates = %pulses, "Tick complete");
    }

    /// Fire the task in `index` if it is due. Returns whether a callback ran.
    fn dispatch_slot(&mut self, index: usize) -> bool {
        let mut task = match std::mem::replace(&mut self.slots[index], Slot::Free) {
            Slot::Armed(task) if task.is_due(self.now, self.pass) => task,
            other => {
                self.slots[index] = other;
                return false;
            }
        };

        let id = task.info.id;
        self.slots[index] = Slot::Firing(task.info);
        self.stats.record_fired();
        trace!(task = %id, now = %self.now, expiry = %task.info.expiry, "Dispatching task");

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| (task.callback)(self))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                if matches!(self.slots[index], Slot::Firing(_)) {
                    self.slots[index] = Slot::Free;
                }
                self.dispatching = false;
                self.stats.record_completion(true);
                warn!(task = %id, "Task callback panicked; slot freed");
                panic::resume_unwind(payload);
            }
        };

        if !matches!(self.slots[index], Slot::Firing(_)) {
            debug!(task = %id, ?outcome, "Task cancelled by its own callback");
            return true;
        }

        if task.info.flags.is_periodic() && outcome == TaskOutcome::Repeat {
            task.info.expiry = self
                .now
                .offset(ms_to_ticks(task.info.interval_ms, self.ticks_per_ms));
            trace!(task = %id, expiry = %task.info.expiry, "Task re-armed");
            self.slots[index] = Slot::Armed(task);
            self.stats.record_rearm();
        } else {
            self.slots[index] = Slot::Free;
            if outcome == TaskOutcome::Error {
                warn!(task = %id, "Task reported an error");
            }
            self.stats.record_completion(outcome == TaskOutcome::Error);
            debug!(task = %id, ?outcome, "Task slot freed");
        }

        true
    }

    /// Whether `rate`'s period elapsed on the latest tick call.
    pub fn fired(&self, rate: Rate) -> bool {
        self.rates.fired(rate)
    }

    /// All rates whose period elapsed on the latest tick call.
    pub fn fired_rates(&self) -> RateSet {
        self.rates.fired_rates()
    }

    /// Rate phase accumulators.
    pub fn rate_flags(&self) -> &RateFlags {
        &self.rates
    }

    /// Busy-wait `duration_ms` on this scheduler's clock.
    ///
    /// Blocks the caller entirely: no tasks are dispatched and no flags are
    /// updated while waiting. See [`delay::delay_ms`].
    pub fn delay_ms(&self, duration_ms: u32, on_idle: Option<&mut dyn FnMut()>) {
        delay::delay_ms(&self.clock, duration_ms, self.ticks_per_ms, on_idle);
    }
}

impl<C, const N: usize> fmt::Debug for Scheduler<C, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let occupied: Vec<TaskInfo> = self.slots.iter().filter_map(Slot::info).copied().collect();
        f.debug_struct("Scheduler")
            .field("now", &self.now)
            .field("ticks_per_ms", &self.ticks_per_ms)
            .field("capacity", &N)
            .field("tasks", &occupied)
            .field("fired_rates", &self.rates.fired_rates())
            .finish_non_exhaustive()
    }
}

/// Builder for configuring the scheduler.
pub struct SchedulerBuilder<C, const N: usize = DEFAULT_CAPACITY> {
    clock: C,
    ticks_per_ms: u32,
}

impl<C: TimeSource, const N: usize> SchedulerBuilder<C, N> {
    /// Create a new builder around `clock`.
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            ticks_per_ms: 1,
        }
    }

    /// Set the counter's tick-to-millisecond ratio.
    #[must_use]
    pub fn ticks_per_ms(mut self, ticks_per_ms: u32) -> Self {
        self.ticks_per_ms = ticks_per_ms;
        self
    }

    /// Build and initialize the scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`TickerError::Config`] if the tick ratio is zero.
    pub fn build(self) -> TickerResult<Scheduler<C, N>> {
        if self.ticks_per_ms == 0 {
            return Err(TickerError::Config("ticks_per_ms must be at least 1".into()));
        }

        let scheduler = Scheduler::with_ticks_per_ms(self.clock, self.ticks_per_ms);
        info!(
            now = %scheduler.now,
            ticks_per_ms = scheduler.ticks_per_ms,
            capacity = N,
            "Scheduler initialized"
        );
        Ok(scheduler)
    }
}
