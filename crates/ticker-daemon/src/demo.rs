//! Demo workload for the main loop.
//!
//! Exercises both halves of the engine: a periodic heartbeat task and a
//! one-shot startup task in the task table, plus a blink indicator and a
//! status line driven by rate flags.

use std::cell::Cell;
use std::rc::Rc;
use ticker_common::config::{duration_to_ms, DemoConfig};
use ticker_common::error::{TickerError, TickerResult};
use ticker_runtime::clock::TimeSource;
use ticker_runtime::scheduler::Scheduler;
use ticker_runtime::task::TaskOutcome;
use tracing::{debug, info, trace};

/// State of the demo workload.
#[derive(Debug)]
pub struct Demo {
    config: DemoConfig,
    led_on: bool,
    blinks: u64,
    status_lines: u64,
    heartbeats: Rc<Cell<u64>>,
}

impl Demo {
    /// Create the workload described by `config`.
    pub fn new(config: DemoConfig) -> Self {
        Self {
            config,
            led_on: false,
            blinks: 0,
            status_lines: 0,
            heartbeats: Rc::new(Cell::new(0)),
        }
    }

    /// Schedule the heartbeat and startup tasks.
    pub fn install<C: TimeSource + 'static, const N: usize>(
        &self,
        scheduler: &mut Scheduler<C, N>,
    ) -> TickerResult<()> {
        let interval_ms = duration_to_ms(self.config.heartbeat_interval).ok_or_else(|| {
            TickerError::Config("heartbeat_interval does not fit in 32-bit milliseconds".into())
        })?;

        let beats = Rc::clone(&self.heartbeats);
        let heartbeat = scheduler.schedule_periodic(interval_ms, move |s| {
            beats.set(beats.get() + 1);
            trace!(now = %s.now(), count = beats.get(), "Heartbeat");
            TaskOutcome::Repeat
        })?;

        let startup = scheduler.schedule_once(0, |s| {
            info!(
                active_tasks = s.active_tasks(),
                capacity = s.capacity(),
                "Startup task ran"
            );
            TaskOutcome::Done
        })?;

        debug!(%heartbeat, %startup, interval_ms, "Demo tasks scheduled");
        Ok(())
    }

    /// React to the rate flags raised by the latest tick call.
    pub fn on_tick<C: TimeSource, const N: usize>(&mut self, scheduler: &Scheduler<C, N>) {
        if scheduler.fired(self.config.blink_rate) {
            self.led_on = !self.led_on;
            self.blinks += 1;
            debug!(led = self.led_on, rate = %self.config.blink_rate, "Blink");
        }

        if scheduler.fired(self.config.status_rate) {
            self.status_lines += 1;
            info!(
                now = %scheduler.now(),
                active_tasks = scheduler.active_tasks(),
                heartbeats = self.heartbeats.get(),
                blinks = self.blinks,
                rates = %scheduler.fired_rates(),
                "Status"
            );
        }
    }

    /// Current blink indicator state.
    pub fn led_on(&self) -> bool {
        self.led_on
    }

    /// Blink toggles so far.
    pub fn blinks(&self) -> u64 {
        self.blinks
    }

    /// Status lines logged so far.
    pub fn status_lines(&self) -> u64 {
        self.status_lines
    }

    /// Heartbeat task firings so far.
    pub fn heartbeats(&self) -> u64 {
        self.heartbeats.get()
    }
}
