use thiserror::Error;

/// Reasons a scheduling request can be refused.
///
/// A refused request never mutates the task table.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    /// Every slot in the task table is occupied.
    #[error("task table full: all {capacity} slots are occupied")]
    TableFull {
        /// Capacity of the table that rejected the request.
        capacity: usize,
    },

    /// The request carried no callback.
    #[error("no callback supplied")]
    MissingCallback,

    /// The interval is too long to compare correctly across counter wraparound.
    #[error("interval of {interval_ms}ms exceeds the {max_ms}ms wraparound horizon")]
    IntervalTooLong {
        /// Requested interval.
        interval_ms: u32,
        /// Longest interval accepted at the scheduler's tick ratio.
        max_ms: u32,
    },
}

/// Ticker error types covering configuration, rate parsing, and scheduling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TickerError {
    /// Configuration or initialization error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A rate string or frequency that is not one of the supported rates.
    #[error("invalid rate '{0}': expected one of 1, 2, 5, 10, 20, 50, 100, 200, 500, 1000 Hz")]
    InvalidRate(String),

    /// A scheduling request was refused.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Convenience type alias for Ticker operations.
pub type TickerResult<T> = Result<T, TickerError>;
