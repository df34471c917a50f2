//! Task table data model.
//!
//! A task is a boxed callback plus its timing: an interval in milliseconds
//! and the absolute tick at which it next becomes eligible. Slots are
//! identified by their index in the table; a slot is free when it holds no
//! callback.

use crate::scheduler::Scheduler;
use bitflags::bitflags;
use std::fmt;
use ticker_common::time::Tick;

/// Handle returned by a successful scheduling request.
///
/// Equal to the index of the slot the task occupies and stable until that
/// slot is freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub usize);

impl TaskId {
    /// Slot index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// Options controlling how a task is treated after it fires.
    ///
    /// The empty set is [`TaskFlags::ONE_SHOT`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TaskFlags: u8 {
        /// Re-arm after each firing that returns [`TaskOutcome::Repeat`].
        const PERIODIC = 1;
    }
}

impl TaskFlags {
    /// Fire once, then free the slot (the default).
    pub const ONE_SHOT: TaskFlags = TaskFlags::empty();

    /// Whether the task re-arms on [`TaskOutcome::Repeat`].
    #[must_use]
    pub fn is_periodic(self) -> bool {
        self.contains(TaskFlags::PERIODIC)
    }
}

/// Value returned by a task callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskOutcome {
    /// Work finished; free the slot.
    Done,
    /// Run again after another interval (honoured only for periodic tasks).
    Repeat,
    /// Work failed. Bookkeeping is identical to [`TaskOutcome::Done`].
    Error,
}

/// Boxed task callback.
///
/// The callback owns whatever state it needs and receives the scheduler
/// that dispatched it, through which it may schedule or cancel tasks.
pub type TaskFn<C, const N: usize> = Box<dyn FnMut(&mut Scheduler<C, N>) -> TaskOutcome>;

/// Scheduling metadata of a live task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskInfo {
    /// Slot the task occupies.
    pub id: TaskId,
    /// Flags given at scheduling time.
    pub flags: TaskFlags,
    /// Requested period in milliseconds.
    pub interval_ms: u32,
    /// Tick at which the task next becomes eligible.
    pub expiry: Tick,
}

/// An occupied slot's contents.
pub(crate) struct Task<C, const N: usize> {
    pub(crate) info: TaskInfo,
    /// Dispatch pass during which the task was armed.
    pub(crate) armed_pass: u64,
    pub(crate) callback: TaskFn<C, N>,
}

impl<C, const N: usize> Task<C, N> {
    /// Eligible when its expiry has been reached and it was not armed
    /// during the pass now running.
    pub(crate) fn is_due(&self, now: Tick, pass: u64) -> bool {
        self.armed_pass != pass && now.has_reached(self.info.expiry)
    }
}

/// One cell of the task table.
pub(crate) enum Slot<C, const N: usize> {
    /// Available for scheduling.
    Free,
    /// Waiting for its expiry.
    Armed(Task<C, N>),
    /// Callback currently running; the task has been moved out of the table.
    Firing(TaskInfo),
}

impl<C, const N: usize> Slot<C, N> {
    pub(crate) fn is_free(&self) -> bool {
        matches!(self, Slot::Free)
    }

    pub(crate) fn info(&self) -> Option<&TaskInfo> {
        match self {
            Slot::Free => None,
            Slot::Armed(task) => Some(&task.info),
            Slot::Firing(info) => Some(info),
        }
    }
}
