#![doc = "Cooperative task scheduler and multi-rate tick-flag engine."]

pub mod clock;
pub mod delay;
pub mod rate_flags;
pub mod scheduler;
pub mod task;

pub use clock::*;
pub use delay::*;
pub use rate_flags::*;
pub use scheduler::*;
pub use task::{TaskFlags, TaskFn, TaskId, TaskInfo, TaskOutcome};
